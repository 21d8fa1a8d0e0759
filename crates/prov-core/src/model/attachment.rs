//! Registros de diagnóstico adjuntos a la ejecución de una fase.
//!
//! Un attachment es inmutable: severidad, título legible, detalle
//! estructurado opcional y un discriminador `kind` cerrado. El kind sólo
//! participa en la regla de direccionamiento externo `(kind, ordinal)`
//! (ver `address`), no en la semántica del modelo.

use serde::{Deserialize, Serialize};

use super::ActivityStatus;

/// Conjunto cerrado de tipos de attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentKind {
    /// Anotación genérica.
    Note,
    /// Detalle de fallo capturado (p. ej. un error del proveedor).
    Failure,
    /// Marcador sintético de interrupción (reinicio del proceso, sweep).
    Interrupted,
}

impl AttachmentKind {
    /// Segmento estable usado en direcciones externas.
    pub fn slug(self) -> &'static str {
        match self {
            AttachmentKind::Note => "note",
            AttachmentKind::Failure => "failure",
            AttachmentKind::Interrupted => "interrupted",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "note" => Some(AttachmentKind::Note),
            "failure" => Some(AttachmentKind::Failure),
            "interrupted" => Some(AttachmentKind::Interrupted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub severity: ActivityStatus,
    pub title: String,
    /// Payload estructurado opcional (detalle de error capturado, etc.).
    pub detail: Option<serde_json::Value>,
    pub kind: AttachmentKind,
}

impl Attachment {
    pub fn note(title: impl Into<String>) -> Self {
        Self { severity: ActivityStatus::Ok,
               title: title.into(),
               detail: None,
               kind: AttachmentKind::Note }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self { severity: ActivityStatus::Warn,
               title: title.into(),
               detail: None,
               kind: AttachmentKind::Note }
    }

    /// Diagnóstico de severidad Fail: adjuntarlo vía `ActivityStore::attach`
    /// fuerza la completación de la actividad.
    pub fn failure(title: impl Into<String>, detail: Option<serde_json::Value>) -> Self {
        Self { severity: ActivityStatus::Fail,
               title: title.into(),
               detail,
               kind: AttachmentKind::Failure }
    }

    /// Marcador sintético de interrupción, severidad Ok.
    pub fn interrupted(title: impl Into<String>) -> Self {
        Self { severity: ActivityStatus::Ok,
               title: title.into(),
               detail: None,
               kind: AttachmentKind::Interrupted }
    }
}
