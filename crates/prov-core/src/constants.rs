//! Constantes compartidas del núcleo.

/// Capacidad por defecto del archivo rotativo de actividades completadas.
pub const DEFAULT_ARCHIVE_CAPACITY: usize = 100;
