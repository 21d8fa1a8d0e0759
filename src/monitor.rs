//! Superficie de señales del orquestador hacia el núcleo.
//!
//! Se encarga de:
//! - Traducir las señales del scheduler ("provisioning started / completed /
//!   failed", eventos del agente) a operaciones del `ActivityStore`.
//! - El barrido periódico (sweep) que completa actividades cuyo recurso
//!   desapareció sin señal explícita; idempotente y seguro en concurrencia
//!   con la mutación normal.
//! - La recarga administrativa de capacidad del archivo rotativo.
//!
//! No hay singleton global: el monitor se construye explícitamente (o desde
//! el entorno vía `init_from_env`) y se inyecta a los colaboradores.

use std::sync::Arc;

use prov_core::{Activity, ActivityId, ActivityStore, Attachment, ProvisioningPhase};
use prov_persistence::{load_state, FileStatePersister, StateConfig};

pub struct ProvisioningMonitor {
    store: Arc<ActivityStore>,
}

impl ProvisioningMonitor {
    pub fn new(store: Arc<ActivityStore>) -> Self {
        Self { store }
    }

    /// Construcción completa desde el entorno: carga el estado persistido,
    /// aplica las reglas de recuperación (resize + Provisioning colgadas) y
    /// deja el archivo como persister de cada mutación.
    pub fn init_from_env() -> Self {
        let config = StateConfig::from_env();
        Self::init_with_config(&config)
    }

    pub fn init_with_config(config: &StateConfig) -> Self {
        let state = load_state(&config.state_file, config.archive_capacity);
        let persister = FileStatePersister::new(&config.state_file);
        let store = ActivityStore::from_snapshot(state.into_store_snapshot(),
                                                 config.archive_capacity,
                                                 Some(Box::new(persister)));
        Self { store: Arc::new(store) }
    }

    pub fn store(&self) -> &Arc<ActivityStore> {
        &self.store
    }

    /// Nuevo intento de aprovisionamiento: la actividad nace en
    /// `Provisioning` dentro de la partición activa.
    pub fn on_provisioning_started(&self, id: ActivityId) -> Arc<Activity> {
        self.store.start_activity(id)
    }

    /// Aprovisionamiento exitoso: renombra al nombre definitivo y completa.
    pub fn on_provisioning_completed(&self, id: &ActivityId, final_name: &str) -> Option<Arc<Activity>> {
        let activity = self.store.complete_activity(id, None)?;
        activity.rename(final_name);
        Some(activity)
    }

    /// Aprovisionamiento fallido: adjunta el diagnóstico Fail por la vía
    /// sancionada del store, que fuerza la completación y archiva.
    pub fn on_provisioning_failed(&self,
                                  id: &ActivityId,
                                  detail: serde_json::Value)
                                  -> Option<Arc<Activity>> {
        let activity = self.store.get_activity_for(id)?;
        let attachment = Attachment::failure("provisioning failed", Some(detail));
        let phase = activity.current_phase();
        if let Err(e) = self.store.attach(&activity, phase, attachment) {
            log::warn!("failure diagnostic rejected for {}: {e}", id.name);
        }
        Some(activity)
    }

    /// Intento de lanzamiento del agente. Idempotente frente a
    /// notificaciones duplicadas (relanzamientos).
    pub fn on_agent_launch_attempt(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        self.enter_if_not_already(id, ProvisioningPhase::Launching)
    }

    /// Agente en línea y aceptando trabajo.
    pub fn on_agent_online(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        self.enter_if_not_already(id, ProvisioningPhase::Operating)
    }

    fn enter_if_not_already(&self, id: &ActivityId, phase: ProvisioningPhase) -> Option<Arc<Activity>> {
        let activity = self.store.get_activity_for(id)?;
        if let Err(e) = activity.enter_if_not_already(phase) {
            log::warn!("{phase} signal rejected for {}: {e}", id.name);
        }
        Some(activity)
    }

    /// El agente fue removido del sistema externo: completa la actividad.
    pub fn on_agent_removed(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        self.store.complete_activity(id, None)
    }

    /// Barrido periódico: completa toda actividad que ya lanzó su agente
    /// pero cuyo recurso dejó de estar rastreado externamente. Seguro de
    /// correr en paralelo con la mutación normal; sólo mueve actividades ya
    /// elegibles, y repetirlo es un no-op.
    pub fn sweep<F>(&self, still_tracked: F)
        where F: Fn(&ActivityId) -> bool
    {
        for activity in self.store.get_not_completed_activities() {
            if activity.current_phase() < ProvisioningPhase::Launching {
                // Aún aprovisionando: su destino lo decide la señal de
                // provisioning, no el barrido.
                continue;
            }
            if still_tracked(activity.id()) {
                continue;
            }
            log::debug!("sweeping activity {} no longer tracked externally",
                        activity.id().fingerprint());
            self.store.complete_activity(activity.id(), None);
        }
    }

    /// Recarga administrativa: re-aplica la capacidad del archivo rotativo
    /// conservando las entradas más recientes.
    pub fn reconfigure_capacity(&self, capacity: usize) {
        self.store.resize(capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_core::ActivityStatus;

    fn monitor() -> ProvisioningMonitor {
        ProvisioningMonitor::new(Arc::new(ActivityStore::new(10)))
    }

    #[test]
    fn successful_lifecycle_renames_and_archives() {
        let monitor = monitor();
        let id = ActivityId::with_sub_owner("CloudA", "tmplX", "pending-node");
        monitor.on_provisioning_started(id.clone());
        monitor.on_provisioning_completed(&id, "agent-7");

        let activity = monitor.store().get_potentially_completed_activity_for(&id).unwrap();
        assert_eq!(activity.name(), "agent-7");
        assert_eq!(activity.current_phase(), ProvisioningPhase::Completed);
        assert_eq!(activity.status(), ActivityStatus::Ok);
    }

    #[test]
    fn duplicate_launch_signals_are_no_ops() {
        let monitor = monitor();
        let id = ActivityId::new("CloudA", "n1");
        monitor.on_provisioning_started(id.clone());
        monitor.on_agent_launch_attempt(&id);
        monitor.on_agent_launch_attempt(&id); // relanzamiento duplicado
        let activity = monitor.store().get_activity_for(&id).unwrap();
        assert_eq!(activity.current_phase(), ProvisioningPhase::Launching);
    }

    #[test]
    fn failure_signal_forces_completion() {
        let monitor = monitor();
        let id = ActivityId::new("CloudA", "n1");
        monitor.on_provisioning_started(id.clone());
        let activity = monitor.on_provisioning_failed(&id, serde_json::json!({"err": "quota"}))
                              .unwrap();
        assert_eq!(activity.status(), ActivityStatus::Fail);
        assert_eq!(activity.current_phase(), ProvisioningPhase::Completed);
        assert!(monitor.store().get_not_completed_activities().is_empty());
    }

    #[test]
    fn signals_for_unknown_ids_are_recoverable() {
        let monitor = monitor();
        let ghost = ActivityId::new("CloudA", "ghost");
        assert!(monitor.on_provisioning_completed(&ghost, "x").is_none());
        assert!(monitor.on_provisioning_failed(&ghost, serde_json::Value::Null).is_none());
        assert!(monitor.on_agent_online(&ghost).is_none());
        assert!(monitor.on_agent_removed(&ghost).is_none());
    }

    #[test]
    fn sweep_skips_provisioning_and_tracked_activities() {
        let monitor = monitor();
        let proving = ActivityId::new("CloudA", "proving");
        let tracked = ActivityId::new("CloudA", "tracked");
        let gone = ActivityId::new("CloudA", "gone");
        monitor.on_provisioning_started(proving.clone());
        monitor.on_provisioning_started(tracked.clone());
        monitor.on_provisioning_started(gone.clone());
        monitor.on_agent_launch_attempt(&tracked);
        monitor.on_agent_launch_attempt(&gone);

        monitor.sweep(|id| *id == tracked);
        // Idempotente: una segunda pasada no cambia nada
        monitor.sweep(|id| *id == tracked);

        let swept = monitor.store().get_potentially_completed_activity_for(&gone).unwrap();
        assert_eq!(swept.current_phase(), ProvisioningPhase::Completed);
        assert_eq!(monitor.store().get_not_completed_activities().len(), 2);
        assert_eq!(monitor.store().get_activities().len(), 3);
    }
}
