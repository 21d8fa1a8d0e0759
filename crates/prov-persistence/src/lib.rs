//! prov-persistence
//!
//! Colaborador de persistencia del núcleo: serializa el estado completo del
//! `ActivityStore` a un archivo JSON y lo restaura al arranque aplicando la
//! migración versionada. La persistencia es best-effort por contrato: un
//! fallo al guardar se loguea y el estado en memoria sigue siendo la
//! autoridad del proceso.
//!
//! Módulos:
//! - `state`: modelo serializable versionado + migración v0 -> v1.
//! - `file`: guardado atómico (tmp + rename) y carga tolerante a corrupción.
//! - `config`: carga de configuración desde variables de entorno (.env).
//! - `error`: errores semánticos de la capa.

pub mod config;
pub mod error;
pub mod file;
pub mod state;

pub use config::{init_dotenv, StateConfig};
pub use error::PersistenceError;
pub use file::{load_state, save_state, FileStatePersister};
pub use state::{migrate_state, PersistedState, STATE_FORMAT_VERSION};
