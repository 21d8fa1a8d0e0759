//! Direccionamiento externo de attachments.
//!
//! El kind de un attachment no es único dentro de una fase, así que la
//! dirección externa es `(kind, ordinal-entre-iguales)`: el ordinal cuenta,
//! en orden de append, sólo los attachments del mismo kind dentro de esa
//! ejecución de fase. El ordinal 0 se omite (`"kind"`); los demás se
//! escriben `"kind:ordinal"`.
//!
//! Resolver y parser nunca fallan con error: devuelven `None` ("no
//! direccionable" / "no encontrado") y la capa de presentación decide cómo
//! degradar (texto plano en lugar de link, fila omitida, etc.).

use crate::activity::Activity;
use crate::model::{Attachment, AttachmentKind, ProvisioningPhase};

/// Dirección opaca de un attachment dentro de una fase, o `None` si el
/// attachment no pertenece a esa ejecución.
pub fn resolve_attachment_address(activity: &Activity,
                                  phase: ProvisioningPhase,
                                  attachment: &Attachment)
                                  -> Option<String> {
    let execution = activity.phase_execution(phase)?;
    let mut ordinal = 0usize;
    for candidate in execution.attachments() {
        if candidate == attachment {
            return Some(if ordinal == 0 {
                            attachment.kind.slug().to_string()
                        } else {
                            format!("{}:{}", attachment.kind.slug(), ordinal)
                        });
        }
        if candidate.kind == attachment.kind {
            ordinal += 1;
        }
    }
    None
}

/// Resolución inversa: parsea `"kind"` o `"kind:ordinal"` y devuelve el
/// attachment correspondiente. Kind desconocido, ordinal fuera de rango o
/// sintaxis inválida devuelven `None`, nunca un error.
pub fn lookup_attachment(activity: &Activity,
                         phase: ProvisioningPhase,
                         address: &str)
                         -> Option<Attachment> {
    let (slug, ordinal) = match address.split_once(':') {
        Some((slug, ordinal)) => (slug, ordinal.parse::<usize>().ok()?),
        None => (address, 0),
    };
    let kind = AttachmentKind::from_slug(slug)?;
    let execution = activity.phase_execution(phase)?;
    let found = execution.attachments_of_kind(kind).nth(ordinal).cloned();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ActivityId;

    fn activity_with_attachments() -> Activity {
        let activity = Activity::new(ActivityId::new("CloudA", "node-1"));
        activity.attach(ProvisioningPhase::Provisioning, Attachment::note("first note"))
                .unwrap();
        activity.attach(ProvisioningPhase::Provisioning,
                        Attachment::failure("boom", Some(serde_json::json!({"code": 1}))))
                .unwrap();
        activity.attach(ProvisioningPhase::Provisioning, Attachment::note("second note"))
                .unwrap();
        activity
    }

    #[test]
    fn ordinal_counts_only_attachments_of_the_same_kind() {
        let activity = activity_with_attachments();
        let execution = activity.phase_execution(ProvisioningPhase::Provisioning).unwrap();
        let attachments = execution.attachments().to_vec();

        assert_eq!(resolve_attachment_address(&activity,
                                              ProvisioningPhase::Provisioning,
                                              &attachments[0]),
                   Some("note".to_string()));
        assert_eq!(resolve_attachment_address(&activity,
                                              ProvisioningPhase::Provisioning,
                                              &attachments[1]),
                   Some("failure".to_string()));
        // Segundo note: mismo kind, ordinal 1
        assert_eq!(resolve_attachment_address(&activity,
                                              ProvisioningPhase::Provisioning,
                                              &attachments[2]),
                   Some("note:1".to_string()));
    }

    #[test]
    fn resolve_and_lookup_are_inverse() {
        let activity = activity_with_attachments();
        let execution = activity.phase_execution(ProvisioningPhase::Provisioning).unwrap();
        for attachment in execution.attachments() {
            let address = resolve_attachment_address(&activity,
                                                     ProvisioningPhase::Provisioning,
                                                     attachment).unwrap();
            let found = lookup_attachment(&activity, ProvisioningPhase::Provisioning, &address);
            assert_eq!(found.as_ref(), Some(attachment));
        }
    }

    #[test]
    fn foreign_attachment_is_not_addressable() {
        let activity = activity_with_attachments();
        let foreign = Attachment::warning("never attached");
        assert_eq!(resolve_attachment_address(&activity,
                                              ProvisioningPhase::Provisioning,
                                              &foreign),
                   None);
        // Fase no entrada: tampoco direccionable
        assert_eq!(resolve_attachment_address(&activity,
                                              ProvisioningPhase::Launching,
                                              &foreign),
                   None);
    }

    #[test]
    fn lookup_tolerates_bad_addresses() {
        let activity = activity_with_attachments();
        let phase = ProvisioningPhase::Provisioning;
        assert!(lookup_attachment(&activity, phase, "bogus").is_none());
        assert!(lookup_attachment(&activity, phase, "note:7").is_none());
        assert!(lookup_attachment(&activity, phase, "note:x").is_none());
        assert!(lookup_attachment(&activity, ProvisioningPhase::Operating, "note").is_none());
    }
}
