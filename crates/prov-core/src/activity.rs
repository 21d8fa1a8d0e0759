//! Una actividad: un intento de aprovisionamiento y sus ejecuciones de fase.
//!
//! Rol en el sistema:
//! - Creada al iniciar un intento (entra a `Provisioning` en la construcción).
//! - Mutada por entradas de fase y attachments desde múltiples hilos; todas
//!   las mutaciones se serializan por un lock propio de la actividad, nunca
//!   por un lock global (actividades no relacionadas no contienden).
//! - Los lectores reciben copias defensivas, jamás referencias al interior
//!   del lock.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreStatsError;
use crate::model::{ActivityId, ActivityStatus, Attachment, AttachmentKind, ProvisioningPhase};

/// Ejecución de una fase: instante de entrada + lista append-only de
/// attachments. Su estado es la severidad máxima entre sus attachments
/// (Ok si no hay ninguno).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseExecution {
    pub started_at: DateTime<Utc>,
    attachments: Vec<Attachment>,
}

impl PhaseExecution {
    fn new() -> Self {
        Self { started_at: Utc::now(), attachments: Vec::new() }
    }

    pub fn status(&self) -> ActivityStatus {
        self.attachments
            .iter()
            .map(|a| a.severity)
            .max()
            .unwrap_or_default()
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Sólo los attachments del kind dado, en orden de append. El ordinal
    /// dentro de esta vista es el que usa la regla de direccionamiento.
    pub fn attachments_of_kind(&self, kind: AttachmentKind) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(move |a| a.kind == kind)
    }
}

/// Estado serializable de una actividad (puente hacia la persistencia).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub id: ActivityId,
    pub name: String,
    pub executions: BTreeMap<ProvisioningPhase, PhaseExecution>,
}

#[derive(Debug)]
struct ActivityState {
    name: String,
    executions: BTreeMap<ProvisioningPhase, PhaseExecution>,
}

#[derive(Debug)]
pub struct Activity {
    id: ActivityId,
    state: Mutex<ActivityState>,
}

impl Activity {
    /// Crea la actividad entrando inmediatamente a `Provisioning`.
    pub fn new(id: ActivityId) -> Self {
        let mut executions = BTreeMap::new();
        executions.insert(ProvisioningPhase::Provisioning, PhaseExecution::new());
        let name = id.name.clone();
        Self { id, state: Mutex::new(ActivityState { name, executions }) }
    }

    /// Reconstruye una actividad desde su snapshot persistido.
    pub fn from_snapshot(snapshot: ActivitySnapshot) -> Self {
        Self { id: snapshot.id,
               state: Mutex::new(ActivityState { name: snapshot.name,
                                                 executions: snapshot.executions }) }
    }

    pub fn to_snapshot(&self) -> ActivitySnapshot {
        let state = self.locked();
        ActivitySnapshot { id: self.id.clone(),
                           name: state.name.clone(),
                           executions: state.executions.clone() }
    }

    fn locked(&self) -> MutexGuard<'_, ActivityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn id(&self) -> &ActivityId {
        &self.id
    }

    /// Comparación de identidad por fingerprint.
    pub fn is_for(&self, id: &ActivityId) -> bool {
        self.id.fingerprint() == id.fingerprint()
    }

    /// Nombre de presentación vigente (mutable vía `rename`).
    pub fn name(&self) -> String {
        self.locked().name.clone()
    }

    /// Cambia el nombre visible; la identidad (fingerprint) no se toca.
    pub fn rename(&self, new_name: impl Into<String>) {
        self.locked().name = new_name.into();
    }

    /// Entra estrictamente a una fase. Falla si la fase ya fue entrada, si
    /// falta alguna fase declarada antes, o si la actividad ya está sellada.
    pub fn enter(&self, phase: ProvisioningPhase) -> Result<(), CoreStatsError> {
        let mut state = self.locked();
        Self::check_entry(&state, phase)?;
        state.executions.insert(phase, PhaseExecution::new());
        Ok(())
    }

    /// Variante idempotente para notificaciones duplicadas (p. ej. eventos
    /// de relanzamiento): repetir una fase ya entrada —o señalar una fase no
    /// terminal sobre una actividad ya completada— es un no-op que devuelve
    /// `false`. Una fase fuera de orden sigue siendo error del llamador.
    pub fn enter_if_not_already(&self, phase: ProvisioningPhase) -> Result<bool, CoreStatsError> {
        let mut state = self.locked();
        if state.executions.contains_key(&phase) {
            return Ok(false);
        }
        if state.executions.contains_key(&ProvisioningPhase::Completed) {
            return Ok(false);
        }
        Self::check_entry(&state, phase)?;
        state.executions.insert(phase, PhaseExecution::new());
        Ok(true)
    }

    fn check_entry(state: &ActivityState, phase: ProvisioningPhase) -> Result<(), CoreStatsError> {
        if state.executions.contains_key(&ProvisioningPhase::Completed) {
            return Err(CoreStatsError::ActivityCompleted);
        }
        if state.executions.contains_key(&phase) {
            return Err(CoreStatsError::PhaseAlreadyEntered(phase));
        }
        for previous in phase.predecessors() {
            if !state.executions.contains_key(&previous) {
                return Err(CoreStatsError::PhaseOutOfOrder { attempted: phase,
                                                             missing: previous });
            }
        }
        Ok(())
    }

    /// Sella la actividad entrando a `Completed` directamente desde la fase
    /// vigente (único camino donde se permite saltar fases intermedias: el
    /// fallo forzado y la recuperación tras reinicio). Devuelve `true` sólo
    /// para la llamada que efectivamente selló; las siguientes son no-op.
    pub fn force_complete(&self) -> bool {
        let mut state = self.locked();
        if state.executions.contains_key(&ProvisioningPhase::Completed) {
            return false;
        }
        state.executions.insert(ProvisioningPhase::Completed, PhaseExecution::new());
        true
    }

    /// Adjunta un diagnóstico a una fase ya entrada. Permitido incluso
    /// después de la completación (un proveedor puede terminar una escritura
    /// asíncrona cuando el nodo ya fue destruido).
    pub fn attach(&self, phase: ProvisioningPhase, attachment: Attachment) -> Result<(), CoreStatsError> {
        let mut state = self.locked();
        match state.executions.get_mut(&phase) {
            Some(execution) => {
                execution.attachments.push(attachment);
                Ok(())
            }
            None => Err(CoreStatsError::PhaseNotEntered(phase)),
        }
    }

    /// Severidad máxima entre todas las fases entradas.
    pub fn status(&self) -> ActivityStatus {
        self.locked()
            .executions
            .values()
            .map(PhaseExecution::status)
            .max()
            .unwrap_or_default()
    }

    /// Fase más alta entrada hasta el momento.
    pub fn current_phase(&self) -> ProvisioningPhase {
        self.locked()
            .executions
            .keys()
            .next_back()
            .copied()
            .unwrap_or(ProvisioningPhase::Provisioning)
    }

    /// Instante de inicio del intento (entrada a la primera fase).
    pub fn started_at(&self) -> DateTime<Utc> {
        self.locked()
            .executions
            .values()
            .map(|e| e.started_at)
            .min()
            .unwrap_or_else(Utc::now)
    }

    /// Copia defensiva de la ejecución de una fase, si fue entrada.
    pub fn phase_execution(&self, phase: ProvisioningPhase) -> Option<PhaseExecution> {
        self.locked().executions.get(&phase).cloned()
    }

    /// Snapshot de todas las ejecuciones en orden de fase.
    pub fn executions(&self) -> BTreeMap<ProvisioningPhase, PhaseExecution> {
        self.locked().executions.clone()
    }
}
