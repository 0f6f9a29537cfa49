//! Shared build pipeline entrypoint.

use std::path::PathBuf;

use serde::Serialize;

use modpack_core::{BuildConfig, BuildPaths, ClearMode, ManifestStrategy};

use crate::manifest::CopyManifest;
use crate::reporter::{Reporter, SyncEvent};
use crate::synchronizer::Synchronizer;
use crate::verify::{verify_mod_directory, VerifyIssue};
use crate::SyncError;

/// Switches for a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Plan only; the filesystem is left untouched.
    pub dry_run: bool,
    /// Hash-compare the mod directory against the source afterwards.
    /// Ignored in dry-run mode.
    pub verify: bool,
}

/// Outcome of a build run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub mod_name: String,
    pub project_root: PathBuf,
    pub output_root: PathBuf,
    pub mod_directory: PathBuf,
    pub dry_run: bool,
    pub clear_mode: ClearMode,
    pub strategy: ManifestStrategy,
    pub events: Vec<SyncEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Vec<VerifyIssue>>,
}

impl SyncReport {
    pub fn files_copied(&self) -> usize {
        self.count(|e| matches!(e, SyncEvent::FileCopied { .. }))
    }

    pub fn bytes_copied(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                SyncEvent::FileCopied { bytes, .. } => *bytes,
                _ => 0,
            })
            .sum()
    }

    /// Relevant entries removed, whatever their state before the run.
    pub fn entries_cleared(&self) -> usize {
        self.count(|e| {
            matches!(
                e,
                SyncEvent::FolderCleared { .. }
                    | SyncEvent::EmptyFolderRemoved { .. }
                    | SyncEvent::StaleEntryRemoved { .. }
            )
        })
    }

    pub fn directories_created(&self) -> usize {
        self.count(|e| {
            matches!(
                e,
                SyncEvent::OutputRootCreated { .. }
                    | SyncEvent::ModDirectoryCreated { .. }
                    | SyncEvent::DirectoryCreated { .. }
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|e| matches!(e, SyncEvent::SourceSkipped { .. }))
    }

    /// Issues found by verification; empty when verification did not run.
    pub fn verify_issues(&self) -> &[VerifyIssue] {
        self.verification.as_deref().unwrap_or_default()
    }

    fn count(&self, pred: impl Fn(&SyncEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Run a full build: output root → clear or create mod directory → copy
/// (→ verify).
///
/// This is the canonical entrypoint for the `modpack` binary.
pub fn run<R: Reporter>(
    config: &BuildConfig,
    paths: &BuildPaths,
    options: RunOptions,
    reporter: R,
) -> Result<SyncReport, SyncError> {
    tracing::debug!("project directory: {}", paths.project_root.display());
    tracing::debug!("output directory: {}", paths.output_root.display());

    let mut sync = Synchronizer::new(reporter).with_dry_run(options.dry_run);
    sync.ensure_output_root(&paths.output_root)?;

    if paths.mod_directory.is_dir() {
        tracing::debug!("checking for folders to clear in destination");
    }
    sync.prepare_mod_directory(&paths.mod_directory, &config.relevant_folders, config.clear_mode)?;

    let manifest = CopyManifest::from_config(config);
    let resolved =
        sync.populate_mod_directory(&paths.project_root, &paths.mod_directory, &manifest)?;

    let verification = if options.verify && !options.dry_run {
        Some(verify_mod_directory(
            &paths.project_root,
            &paths.mod_directory,
            &resolved,
        )?)
    } else {
        None
    };

    Ok(SyncReport {
        mod_name: config.mod_name.0.clone(),
        project_root: paths.project_root.clone(),
        output_root: paths.output_root.clone(),
        mod_directory: paths.mod_directory.clone(),
        dry_run: options.dry_run,
        clear_mode: config.clear_mode,
        strategy: config.strategy,
        events: sync.into_events(),
        verification,
    })
}
