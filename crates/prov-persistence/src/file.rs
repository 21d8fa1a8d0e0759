//! Guardado y carga del estado en un archivo JSON.
//!
//! Guardado atómico: se escribe a `<path>.tmp` y se renombra sobre el
//! destino, así un proceso que muere a mitad de escritura nunca deja un
//! estado truncado. Carga tolerante: un archivo ausente arranca vacío; un
//! archivo corrupto se renombra a `<path>.corrupt` (preservado para
//! diagnóstico, jamás sobreescrito en silencio) y también se arranca vacío.

use std::fs;
use std::path::{Path, PathBuf};

use prov_core::{StatePersister, StoreSnapshot};

use crate::error::PersistenceError;
use crate::state::{migrate_state, PersistedState};

/// Implementación de `StatePersister` sobre un archivo JSON.
pub struct FileStatePersister {
    path: PathBuf,
}

impl FileStatePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatePersister for FileStatePersister {
    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        save_state(&self.path, &PersistedState::from_store(snapshot))?;
        Ok(())
    }
}

pub fn save_state(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    log::debug!("state saved to {} ({} active / {} archived)",
                path.display(),
                state.active.len(),
                state.archived.len());
    Ok(())
}

/// Carga el estado persistido. Nunca falla: ante cualquier anomalía degrada
/// a un estado vacío con la capacidad configurada, preservando la
/// disponibilidad del proceso.
pub fn load_state(path: &Path, configured_capacity: usize) -> PersistedState {
    if !path.exists() {
        return PersistedState::empty(configured_capacity);
    }
    match read_state(path) {
        Ok(state) => state,
        Err(e) => {
            let quarantine = path.with_extension("corrupt");
            log::warn!("state file {} unreadable ({e}); preserving it as {} and starting empty",
                       path.display(),
                       quarantine.display());
            if let Err(rename_err) = fs::rename(path, &quarantine) {
                log::warn!("could not preserve corrupt state file: {rename_err}");
            }
            PersistedState::empty(configured_capacity)
        }
    }
}

fn read_state(path: &Path) -> Result<PersistedState, PersistenceError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    migrate_state(value)
}
