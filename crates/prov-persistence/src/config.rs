//! Carga de configuración desde variables de entorno (.env).
//! Convención `PROVSTATS_*`; todos los parámetros tienen default razonable.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use prov_core::constants::DEFAULT_ARCHIVE_CAPACITY;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone)]
pub struct StateConfig {
    /// Ruta del archivo de estado JSON.
    pub state_file: PathBuf,
    /// Capacidad del archivo rotativo de completadas (entero positivo).
    pub archive_capacity: usize,
}

impl StateConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let state_file = env::var("PROVSTATS_STATE_FILE").map(PathBuf::from)
                                                         .unwrap_or_else(|_| PathBuf::from("provstats-state.json"));
        let archive_capacity = env::var("PROVSTATS_ARCHIVE_CAPACITY").ok()
                                                                     .and_then(|v| v.parse().ok())
                                                                     .unwrap_or(DEFAULT_ARCHIVE_CAPACITY);
        Self { state_file, archive_capacity }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
