//! Tipos base del modelo de seguimiento.
//!
//! - `phase`: fases ordenadas del ciclo de vida de una actividad.
//! - `status`: severidades agregables (Ok < Warn < Fail).
//! - `id`: identidad de una actividad (owner, sub-owner, fingerprint).
//! - `attachment`: registros de diagnóstico inmutables adjuntos a una fase.

pub mod attachment;
pub mod id;
pub mod phase;
pub mod status;

pub use attachment::{Attachment, AttachmentKind};
pub use id::ActivityId;
pub use phase::ProvisioningPhase;
pub use status::ActivityStatus;
