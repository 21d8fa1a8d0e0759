//! Severidad de una actividad o de un registro adjunto.
//!
//! El estado agregado de cualquier conjunto (attachments de una fase, fases
//! de una actividad) es el máximo de sus constituyentes, por eso el orden
//! derivado `Ok < Warn < Fail` es parte del contrato.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityStatus {
    /// Sin anomalías registradas.
    #[default]
    Ok,
    /// Anomalía no fatal.
    Warn,
    /// Fallo terminal: fuerza la completación de la actividad.
    Fail,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityStatus::Ok => "OK",
            ActivityStatus::Warn => "WARN",
            ActivityStatus::Fail => "FAIL",
        };
        f.write_str(name)
    }
}
