//! modpack core library: domain types, build configuration, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and configuration enums
//! - [`config`]: `modpack.yaml` loading and validation
//! - [`paths`]: per-run path resolution ([`BuildPaths`])
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use config::BuildConfig;
pub use error::ConfigError;
pub use paths::BuildPaths;
pub use types::{ClearMode, FolderName, ManifestEntry, ManifestStrategy, ModName};
