//! prov-core: núcleo de seguimiento de actividades de aprovisionamiento.
//!
//! Rol en el sistema:
//! - `ring`: buffer circular acotado y thread-safe (base del archivo).
//! - `model`: fases, severidades, identidad y attachments.
//! - `activity`: una actividad con sus ejecuciones de fase.
//! - `store`: particiones activa/archivada con invariante de unicidad y
//!   hook de persistencia fire-and-forget.
//! - `index`: agrupación de solo lectura por owner / (owner, sub-owner).
//! - `health`: métricas de éxito overall y con decaimiento temporal.
//! - `address`: direccionamiento externo `(kind, ordinal)` de attachments.

pub mod activity;
pub mod address;
pub mod constants;
pub mod errors;
pub mod health;
pub mod index;
pub mod model;
pub mod ring;
pub mod store;

pub use activity::{Activity, ActivitySnapshot, PhaseExecution};
pub use address::{lookup_attachment, resolve_attachment_address};
pub use errors::CoreStatsError;
pub use health::{Health, Percentage};
pub use index::ActivityIndex;
pub use model::{ActivityId, ActivityStatus, Attachment, AttachmentKind, ProvisioningPhase};
pub use ring::BoundedRing;
pub use store::{ActivityStore, StatePersister, StoreSnapshot};
