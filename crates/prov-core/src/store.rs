//! Particiones activa/archivada de actividades y su invariante de unicidad.
//!
//! Rol en el sistema:
//! - `active`: actividades en curso (fase vigente != Completed).
//! - `archive`: ring acotado de actividades completadas (rotación FIFO).
//! - Invariante: en todo instante observable, la unión contiene cada
//!   actividad exactamente una vez; el movimiento active -> archive es
//!   atómico respecto de cualquier snapshot (`get_activities`).
//! - Los efectos de persistencia son fire-and-forget: un fallo al guardar se
//!   loguea y se descarta; el estado en memoria sigue siendo la autoridad.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::activity::{Activity, ActivitySnapshot};
use crate::errors::CoreStatsError;
use crate::index::ActivityIndex;
use crate::model::{ActivityId, ActivityStatus, Attachment, ProvisioningPhase};
use crate::ring::BoundedRing;

/// Colaborador de persistencia: recibe snapshots completos del estado.
/// El store nunca lo invoca con sus locks tomados.
pub trait StatePersister: Send + Sync {
    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Estado completo serializable del store (contrato marshal/unmarshal).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoreSnapshot {
    pub capacity: usize,
    pub active: Vec<ActivitySnapshot>,
    pub archived: Vec<ActivitySnapshot>,
}

struct StoreInner {
    active: Vec<Arc<Activity>>,
    archive: BoundedRing<Arc<Activity>>,
}

pub struct ActivityStore {
    inner: Mutex<StoreInner>,
    persister: Option<Box<dyn StatePersister>>,
}

impl ActivityStore {
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(StoreInner { active: Vec::new(),
                                              archive: BoundedRing::new(capacity) }),
               persister: None }
    }

    pub fn with_persister(capacity: usize, persister: Box<dyn StatePersister>) -> Self {
        Self { inner: Mutex::new(StoreInner { active: Vec::new(),
                                              archive: BoundedRing::new(capacity) }),
               persister: Some(persister) }
    }

    /// Reconstruye el store desde un snapshot persistido aplicando las
    /// reglas de recuperación ANTES de quedar consultable:
    /// - El ring se rearma con la capacidad configurada conservando sólo las
    ///   entradas más recientes (resize-on-load).
    /// - Toda actividad activa que quedó en `Provisioning` murió con el
    ///   proceso: se completa con un attachment sintético Ok "interrupted by
    ///   restart" y se archiva de inmediato.
    pub fn from_snapshot(snapshot: StoreSnapshot,
                         configured_capacity: usize,
                         persister: Option<Box<dyn StatePersister>>)
                         -> Self {
        let archived: Vec<Arc<Activity>> = snapshot.archived
                                                   .into_iter()
                                                   .map(|s| Arc::new(Activity::from_snapshot(s)))
                                                   .collect();
        let archive = BoundedRing::with_items(configured_capacity, archived);

        let mut active: Vec<Arc<Activity>> = Vec::new();
        for persisted in snapshot.active {
            let activity = Arc::new(Activity::from_snapshot(persisted));
            match activity.current_phase() {
                ProvisioningPhase::Provisioning => {
                    log::debug!("force-completing activity {} stuck in provisioning after restart",
                                activity.id().fingerprint());
                    let _ = activity.attach(ProvisioningPhase::Provisioning,
                                            Attachment::interrupted("interrupted by restart"));
                    activity.force_complete();
                    archive.add(activity);
                }
                // Defensivo: una actividad completada jamás debería venir en
                // la partición activa, pero si viene va directo al archivo.
                ProvisioningPhase::Completed => {
                    archive.add(activity);
                }
                _ => active.push(activity),
            }
        }

        Self { inner: Mutex::new(StoreInner { active, archive }),
               persister }
    }

    fn locked(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Crea y registra una nueva actividad (entra a `Provisioning`).
    /// Seguro bajo inicios concurrentes de ids distintos.
    pub fn start_activity(&self, id: ActivityId) -> Arc<Activity> {
        let activity = Arc::new(Activity::new(id));
        self.locked().active.push(Arc::clone(&activity));
        self.request_save();
        activity
    }

    /// Completa una actividad por id. Busca primero en `active` y luego en
    /// el archivo (tolerante a señales tardías sobre actividades ya
    /// rotadas). Id desconocido: warn + `None`, siempre recuperable.
    pub fn complete_activity(&self,
                             id: &ActivityId,
                             on_failure: Option<Attachment>)
                             -> Option<Arc<Activity>> {
        let found_active = {
            let guard = self.locked();
            guard.active.iter().find(|a| a.is_for(id)).cloned()
        };
        if let Some(activity) = found_active {
            if let Some(attachment) = on_failure {
                let phase = activity.current_phase();
                if let Err(e) = activity.attach(phase, attachment) {
                    log::warn!("could not attach completion diagnostic to {}: {e}", id.name);
                }
            }
            activity.force_complete();
            self.archive_activity(&activity);
            self.request_save();
            return Some(activity);
        }

        let archived = {
            let guard = self.locked();
            guard.archive.snapshot().into_iter().find(|a| a.is_for(id))
        };
        if let Some(activity) = archived {
            // Ya completada y rotada: la señal tardía se acepta sin efectos.
            return Some(activity);
        }

        log::warn!("no activity tracked for {} ({}); completion signal dropped",
                   id.name,
                   id.fingerprint());
        None
    }

    /// Mueve una actividad de `active` al ring, atómicamente respecto de
    /// cualquier snapshot: ningún observador la ve en ambas particiones ni
    /// en ninguna. Idempotente: un segundo archive de la misma actividad es
    /// un no-op (ya no está en `active`).
    pub fn archive_activity(&self, activity: &Arc<Activity>) {
        let mut guard = self.locked();
        if let Some(pos) = guard.active.iter().position(|a| a.is_for(activity.id())) {
            let moved = guard.active.remove(pos);
            guard.archive.add(moved);
            log::debug!("archived activity {}", activity.id().fingerprint());
        }
    }

    /// Snapshot de la unión: archivo (más antiguo primero) seguido de las
    /// activas en orden de inserción, tomado bajo una sola sección crítica
    /// para que el punto de corte sea consistente.
    pub fn get_activities(&self) -> Vec<Arc<Activity>> {
        let guard = self.locked();
        let mut all = guard.archive.snapshot();
        all.extend(guard.active.iter().cloned());
        all
    }

    /// Activas del snapshot, filtrando defensivamente cualquier actividad
    /// que haya corrido a `Completed` entre el snapshot y el filtro.
    pub fn get_not_completed_activities(&self) -> Vec<Arc<Activity>> {
        let active = {
            let guard = self.locked();
            guard.active.clone()
        };
        active.into_iter()
              .filter(|a| a.current_phase() != ProvisioningPhase::Completed)
              .collect()
    }

    /// Búsqueda "ruidosa": un miss aquí señala un bug del llamador y se
    /// loguea a warning. Nunca lanza.
    pub fn get_activity_for(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        let found = self.find(id);
        if found.is_none() {
            log::warn!("activity lookup miss for {} ({})", id.name, id.fingerprint());
        }
        found
    }

    /// Búsqueda silenciosa: que la actividad haya rotado fuera del archivo
    /// es un resultado esperado, no un error.
    pub fn get_potentially_completed_activity_for(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        self.find(id)
    }

    fn find(&self, id: &ActivityId) -> Option<Arc<Activity>> {
        self.get_activities().into_iter().find(|a| a.is_for(id))
    }

    /// Único punto de entrada sancionado para adjuntar diagnósticos: delega
    /// en `Activity::attach` y, si la severidad es Fail, fuerza la
    /// completación (exactamente una vez, aun con Fails concurrentes) y
    /// archiva. Finalmente solicita un guardado de estado.
    pub fn attach(&self,
                  activity: &Arc<Activity>,
                  phase: ProvisioningPhase,
                  attachment: Attachment)
                  -> Result<(), CoreStatsError> {
        let severity = attachment.severity;
        activity.attach(phase, attachment)?;
        if severity == ActivityStatus::Fail {
            activity.force_complete();
            self.archive_activity(activity);
        }
        self.request_save();
        Ok(())
    }

    /// Índice de solo lectura sobre un snapshot de la unión.
    pub fn index(&self) -> ActivityIndex {
        ActivityIndex::new(self.get_activities())
    }

    /// Rearma el ring con otra capacidad conservando las entradas más
    /// recientes (recarga administrativa de configuración).
    pub fn resize(&self, new_capacity: usize) {
        let mut guard = self.locked();
        guard.archive = guard.archive.resized(new_capacity);
        drop(guard);
        self.request_save();
    }

    pub fn archive_capacity(&self) -> usize {
        self.locked().archive.capacity()
    }

    /// Estado completo serializable, con el corte activo/archivado tomado
    /// bajo una sola sección crítica.
    pub fn snapshot(&self) -> StoreSnapshot {
        let guard = self.locked();
        StoreSnapshot { capacity: guard.archive.capacity(),
                        active: guard.active.iter().map(|a| a.to_snapshot()).collect(),
                        archived: guard.archive
                                       .snapshot()
                                       .iter()
                                       .map(|a| a.to_snapshot())
                                       .collect() }
    }

    /// Guardado fire-and-forget: se copia el estado, se sueltan los locks y
    /// recién entonces se invoca al persister. Un fallo se loguea y se
    /// descarta (el estado en memoria sigue siendo la autoridad).
    fn request_save(&self) {
        if let Some(persister) = &self.persister {
            let snapshot = self.snapshot();
            if let Err(e) = persister.persist(&snapshot) {
                log::warn!("state save failed: {e}");
            }
        }
    }
}
