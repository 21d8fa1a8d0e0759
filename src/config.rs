//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable
//! (`CONFIG`). La capacidad del archivo rotativo se aplica en la
//! construcción del store y se re-aplica (disparando un resize) en la
//! recarga administrativa vía `ProvisioningMonitor::reconfigure_capacity`.

use once_cell::sync::Lazy;

use prov_persistence::StateConfig;

/// Configuración global de la aplicación (extensible para más secciones).
pub struct AppConfig {
    /// Configuración de seguimiento y persistencia de estado.
    pub tracking: StateConfig,
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| AppConfig { tracking: StateConfig::from_env() });
