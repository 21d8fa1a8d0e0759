//! Errores específicos del núcleo de seguimiento.
//!
//! Cubren violaciones de contrato del llamador (entrar a una fase fuera de
//! orden, repetir una fase, mutar una actividad sellada) y la restricción
//! deliberada de no soportar remoción selectiva en el archivo rotativo.
//! Los "lookup miss" NO son errores: se modelan como `Option` en el store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ProvisioningPhase;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreStatsError {
    #[error("phase {0} already entered")] PhaseAlreadyEntered(ProvisioningPhase),
    #[error("phase {attempted} entered before {missing}")] PhaseOutOfOrder {
        attempted: ProvisioningPhase,
        missing: ProvisioningPhase,
    },
    #[error("phase {0} not entered yet")] PhaseNotEntered(ProvisioningPhase),
    #[error("activity already completed")] ActivityCompleted,
    #[error("selective removal not supported")] RemovalUnsupported,
    #[error("internal: {0}")] Internal(String),
}
