//! Modelo serializable versionado del estado del store.
//!
//! La migración entre versiones es un paso explícito que corre una sola vez
//! sobre el snapshot cargado, antes de que el store lo vea: nada de coerción
//! ad hoc de campos. Historial de versiones:
//! - v0: la partición activa se guardaba como objeto JSON indexado por
//!   fingerprint (y el campo `version` no existía).
//! - v1 (actual): ambas particiones son vectores en orden de inserción.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use prov_core::{ActivitySnapshot, StoreSnapshot};

use crate::error::PersistenceError;

pub const STATE_FORMAT_VERSION: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u64,
    pub capacity: usize,
    pub active: Vec<ActivitySnapshot>,
    pub archived: Vec<ActivitySnapshot>,
}

impl PersistedState {
    pub fn empty(capacity: usize) -> Self {
        Self { version: STATE_FORMAT_VERSION,
               capacity,
               active: Vec::new(),
               archived: Vec::new() }
    }

    pub fn from_store(snapshot: &StoreSnapshot) -> Self {
        Self { version: STATE_FORMAT_VERSION,
               capacity: snapshot.capacity,
               active: snapshot.active.clone(),
               archived: snapshot.archived.clone() }
    }

    pub fn into_store_snapshot(self) -> StoreSnapshot {
        StoreSnapshot { capacity: self.capacity,
                        active: self.active,
                        archived: self.archived }
    }
}

/// Deserializa un estado persistido en cualquier versión conocida y lo
/// lleva al layout vigente. Versiones futuras se rechazan (no se adivina).
pub fn migrate_state(value: Value) -> Result<PersistedState, PersistenceError> {
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
    match version {
        0 => migrate_v0(value),
        STATE_FORMAT_VERSION => Ok(serde_json::from_value(value)?),
        other => Err(PersistenceError::UnsupportedVersion(other)),
    }
}

// v0 -> v1: el objeto `active` indexado por fingerprint pasa a vector. El
// orden de inserción original no se conservaba en v0; el orden de claves es
// suficiente porque la partición activa no garantiza orden entre actividades.
fn migrate_v0(mut value: Value) -> Result<PersistedState, PersistenceError> {
    if let Some(active) = value.get_mut("active") {
        if let Value::Object(map) = active {
            let items: Vec<Value> = map.values().cloned().collect();
            *active = Value::Array(items);
        }
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(STATE_FORMAT_VERSION));
        obj.entry("archived").or_insert_with(|| Value::Array(Vec::new()));
    }
    Ok(serde_json::from_value(value)?)
}
