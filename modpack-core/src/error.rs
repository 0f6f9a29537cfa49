//! Error types for modpack-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating build configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The mod name cannot be used as a directory name.
    #[error("invalid mod name '{name}': {reason}")]
    InvalidModName { name: String, reason: &'static str },

    /// A relevant folder name is not a single plain path component.
    #[error("invalid relevant folder '{name}': {reason}")]
    InvalidFolderName { name: String, reason: &'static str },

    /// The same relevant folder was listed twice.
    #[error("relevant folder '{name}' is listed more than once")]
    DuplicateFolder { name: String },

    /// A manifest entry escapes the project root or is otherwise unusable.
    #[error("invalid manifest pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: &'static str,
    },
}
