//! Fases del ciclo de vida de una actividad de aprovisionamiento.
//!
//! El orden de declaración es significativo: una actividad entra a las fases
//! en orden estrictamente creciente y `Completed` es terminal. El único
//! salto permitido es el camino de fallo forzado (ver `Activity::force_complete`).

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProvisioningPhase {
    /// Adquisición del recurso de cómputo.
    Provisioning,
    /// Lanzamiento del agente sobre el recurso.
    Launching,
    /// Agente en línea y operando.
    Operating,
    /// Fase terminal: la actividad queda sellada.
    Completed,
}

impl ProvisioningPhase {
    /// Fases en orden declarado.
    pub const ALL: [ProvisioningPhase; 4] = [ProvisioningPhase::Provisioning,
                                             ProvisioningPhase::Launching,
                                             ProvisioningPhase::Operating,
                                             ProvisioningPhase::Completed];

    /// Fases declaradas estrictamente antes de `self`, en orden.
    pub fn predecessors(self) -> impl Iterator<Item = ProvisioningPhase> {
        Self::ALL.into_iter().take_while(move |p| *p < self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProvisioningPhase::Completed)
    }
}

impl fmt::Display for ProvisioningPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisioningPhase::Provisioning => "Provisioning",
            ProvisioningPhase::Launching => "Launching",
            ProvisioningPhase::Operating => "Operating",
            ProvisioningPhase::Completed => "Completed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_ordered_as_declared() {
        assert!(ProvisioningPhase::Provisioning < ProvisioningPhase::Launching);
        assert!(ProvisioningPhase::Launching < ProvisioningPhase::Operating);
        assert!(ProvisioningPhase::Operating < ProvisioningPhase::Completed);
    }

    #[test]
    fn predecessors_follow_declared_order() {
        let prev: Vec<_> = ProvisioningPhase::Operating.predecessors().collect();
        assert_eq!(prev, vec![ProvisioningPhase::Provisioning, ProvisioningPhase::Launching]);
        assert_eq!(ProvisioningPhase::Provisioning.predecessors().count(), 0);
    }
}
