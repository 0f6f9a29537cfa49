//! # modpack-sync
//!
//! Directory synchronizer for mod packaging.
//!
//! Call [`pipeline::run`] to package a mod: ensure the output root, clear the
//! relevant folders of the mod directory, then mirror the copy manifest.
//! The individual steps live on [`Synchronizer`].

pub mod error;
pub mod manifest;
pub mod pattern;
pub mod pipeline;
pub mod reporter;
pub mod synchronizer;
pub mod verify;

pub use error::SyncError;
pub use manifest::{CopyManifest, ResolvedPath, SourceKind};
pub use pipeline::{run, RunOptions, SyncReport};
pub use reporter::{Reporter, SyncEvent, TracingReporter};
pub use synchronizer::Synchronizer;
pub use verify::{verify_mod_directory, VerifyIssue};
