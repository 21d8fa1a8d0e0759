//! ProvStats Rust Library
//!
//! Este crate actúa como la capa de orquestación de ProvStats:
//! - Expone `config` con la configuración global del proceso.
//! - Expone `monitor` con la superficie de señales del scheduler hacia el
//!   núcleo de seguimiento.
//!
//! El núcleo (store, ring, índice, salud) vive en `prov-core`; la
//! persistencia de estado en `prov-persistence`.

pub mod config;
pub mod monitor;

pub use monitor::ProvisioningMonitor;
pub use prov_core::{Activity, ActivityId, ActivityIndex, ActivityStatus, ActivityStore,
                    Attachment, AttachmentKind, Health, Percentage, ProvisioningPhase};
