//! Error types for modpack-sync.

use std::path::PathBuf;

use thiserror::Error;

use modpack_core::ConfigError;

/// All errors that can arise from a build run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested output location cannot be used. Raised before any
    /// filesystem mutation.
    #[error("configuration error at {path}: {reason}")]
    Configuration { path: PathBuf, reason: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An exact (non-glob) manifest entry is missing from the source tree.
    #[error("manifest entry '{entry}' not found at {path}")]
    SourceNotFound { entry: String, path: PathBuf },

    /// A manifest entry failed validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
