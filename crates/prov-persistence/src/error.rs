//! Errores de persistencia.
//! Mapea errores de IO / formato a variantes semánticas de la capa.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("unsupported state version: {0}")]
    UnsupportedVersion(u64),
}
