//! Run events and the reporting seam.
//!
//! The synchronizer never logs directly: every decision is emitted as a
//! [`SyncEvent`] through a [`Reporter`]. [`TracingReporter`] turns events into
//! `tracing` diagnostics; a `Vec<SyncEvent>` records them (handy in tests).

use std::path::PathBuf;

use serde::Serialize;

/// A single decision taken (or planned, in dry-run mode) during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The output root did not exist and was created.
    OutputRootCreated { path: PathBuf },
    /// The mod directory did not exist and was created.
    ModDirectoryCreated { path: PathBuf },
    /// A relevant folder with content was removed.
    FolderCleared { name: String, path: PathBuf },
    /// A relevant name existed as a file or link and was removed.
    StaleEntryRemoved { name: String, path: PathBuf },
    /// A relevant folder was already empty and was left in place.
    EmptyFolderKept { name: String, path: PathBuf },
    /// A relevant folder was already empty and was removed.
    EmptyFolderRemoved { name: String, path: PathBuf },
    /// A destination directory was created.
    DirectoryCreated { path: PathBuf },
    /// A file was copied.
    FileCopied {
        from: PathBuf,
        to: PathBuf,
        bytes: u64,
    },
    /// A manifest entry or resolved path contributed nothing.
    SourceSkipped { entry: String, reason: String },
}

/// Receives every [`SyncEvent`] of a run, in order.
pub trait Reporter {
    fn report(&mut self, event: &SyncEvent);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: &SyncEvent) {
        (**self).report(event);
    }
}

impl Reporter for Vec<SyncEvent> {
    fn report(&mut self, event: &SyncEvent) {
        self.push(event.clone());
    }
}

/// Emits events as `tracing` diagnostics: DEBUG for each step, WARN for
/// skipped manifest entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter {
    pub dry_run: bool,
}

impl TracingReporter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl Reporter for TracingReporter {
    fn report(&mut self, event: &SyncEvent) {
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        match event {
            SyncEvent::OutputRootCreated { path } => {
                tracing::debug!("{prefix}creating output directory {}", path.display());
            }
            SyncEvent::ModDirectoryCreated { path } => {
                tracing::debug!("{prefix}creating mod directory {}", path.display());
            }
            SyncEvent::FolderCleared { name, .. } => {
                tracing::debug!("{prefix}clearing \"{name}\" folder");
            }
            SyncEvent::StaleEntryRemoved { name, path } => {
                tracing::debug!("{prefix}removing stale \"{name}\" entry at {}", path.display());
            }
            SyncEvent::EmptyFolderKept { name, .. } => {
                tracing::debug!("{prefix}\"{name}\" folder is already empty; keeping it");
            }
            SyncEvent::EmptyFolderRemoved { name, .. } => {
                tracing::debug!("{prefix}\"{name}\" folder is empty; removing it");
            }
            SyncEvent::DirectoryCreated { path } => {
                tracing::debug!("{prefix}creating directory {}", path.display());
            }
            SyncEvent::FileCopied { from, to, .. } => {
                tracing::debug!("{prefix}copying from {} to {}", from.display(), to.display());
            }
            SyncEvent::SourceSkipped { entry, reason } => {
                tracing::warn!("{prefix}skipping '{entry}': {reason}");
            }
        }
    }
}
