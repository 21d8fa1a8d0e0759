//! Identidad de una actividad.
//!
//! La identidad real es el `fingerprint`, asignado una sola vez en la
//! construcción y estable a través de serialización/restauración. Igualdad
//! y hash se definen exclusivamente por él: owner, sub-owner y nombre son
//! metadatos de presentación (el nombre visible vive en `Activity` y puede
//! renombrarse sin afectar la identidad).

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityId {
    /// Nombre del owner (p. ej. el cloud que originó el intento).
    pub owner: String,
    /// Sub-owner opcional (p. ej. el template dentro del cloud).
    pub sub_owner: Option<String>,
    /// Nombre inicial de presentación.
    pub name: String,
    fingerprint: Uuid,
}

impl ActivityId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(),
               sub_owner: None,
               name: name.into(),
               fingerprint: Uuid::new_v4() }
    }

    pub fn with_sub_owner(owner: impl Into<String>,
                          sub_owner: impl Into<String>,
                          name: impl Into<String>)
                          -> Self {
        Self { owner: owner.into(),
               sub_owner: Some(sub_owner.into()),
               name: name.into(),
               fingerprint: Uuid::new_v4() }
    }

    /// Huella inmutable que distingue esta actividad de cualquier otra.
    pub fn fingerprint(&self) -> Uuid {
        self.fingerprint
    }
}

impl PartialEq for ActivityId {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for ActivityId {}

impl Hash for ActivityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_everything_but_the_fingerprint() {
        let a = ActivityId::new("CloudA", "node-1");
        let b = ActivityId::new("CloudA", "node-1");
        assert_ne!(a, b, "two constructions must never collide");

        // Mismo fingerprint tras un roundtrip de serialización => misma identidad
        let json = serde_json::to_string(&a).unwrap();
        let restored: ActivityId = serde_json::from_str(&json).unwrap();
        assert_eq!(a, restored);
        assert_eq!(a.fingerprint(), restored.fingerprint());
    }
}
