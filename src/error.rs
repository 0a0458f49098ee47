use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the export pipeline and its host adapter.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory does not exist; nothing was processed.
    #[error("Directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// No object was approved for export.
    #[error("No mesh objects selected for export")]
    EmptySelection,

    /// An approved name does not refer to any object in the scene.
    #[error("object not found in scene: {0}")]
    UnknownObject(String),

    /// Invalid export or exporter settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The exporter could not write its output file.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
