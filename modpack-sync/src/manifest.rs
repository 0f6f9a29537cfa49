//! Copy manifest resolution.
//!
//! A [`CopyManifest`] is resolved against the project root into an ordered
//! list of [`ResolvedPath`]s: every directory precedes its contents, and each
//! path appears once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use modpack_core::{BuildConfig, FolderName, ManifestEntry, ManifestStrategy};

use crate::error::SyncError;
use crate::pattern::{walk_err, Pattern};
use crate::reporter::{Reporter, SyncEvent};

/// What a resolved source path is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Directory,
    File,
}

/// A concrete source path, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPath {
    pub relative: PathBuf,
    pub kind: SourceKind,
}

/// The set of source paths to mirror into the mod directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyManifest {
    /// Explicit files, folders and glob patterns.
    Patterns(Vec<ManifestEntry>),
    /// Entire subtrees of the named folders, hidden files included.
    WholeFolders(Vec<FolderName>),
}

impl CopyManifest {
    pub fn from_config(config: &BuildConfig) -> Self {
        match config.strategy {
            ManifestStrategy::Patterns => Self::Patterns(config.entries.clone()),
            ManifestStrategy::WholeFolders => Self::WholeFolders(config.relevant_folders.clone()),
        }
    }

    /// Resolve against `project_root`.
    ///
    /// Returns `SyncError::SourceNotFound` for a missing exact entry that is
    /// not marked optional. Glob entries with no matches contribute nothing.
    pub fn resolve(
        &self,
        project_root: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<Vec<ResolvedPath>, SyncError> {
        let mut resolved = Vec::new();
        let mut seen = HashSet::new();

        match self {
            CopyManifest::Patterns(entries) => {
                for entry in entries {
                    for relative in expand_entry(entry, project_root, reporter)? {
                        push_unique(&mut resolved, &mut seen, project_root, relative, reporter);
                    }
                }
            }
            CopyManifest::WholeFolders(folders) => {
                for folder in folders {
                    let source = project_root.join(folder);
                    if !source.is_dir() {
                        reporter.report(&SyncEvent::SourceSkipped {
                            entry: folder.0.clone(),
                            reason: "folder does not exist in the project root".into(),
                        });
                        continue;
                    }
                    for entry in WalkDir::new(&source).follow_links(false).sort_by_file_name() {
                        let entry = entry.map_err(|e| walk_err(&source, e))?;
                        let Ok(relative) = entry.path().strip_prefix(project_root) else {
                            continue;
                        };
                        push_unique(
                            &mut resolved,
                            &mut seen,
                            project_root,
                            relative.to_path_buf(),
                            reporter,
                        );
                    }
                }
            }
        }

        Ok(resolved)
    }
}

fn expand_entry(
    entry: &ManifestEntry,
    project_root: &Path,
    reporter: &mut dyn Reporter,
) -> Result<Vec<PathBuf>, SyncError> {
    let pattern = Pattern::parse(&entry.path)?;
    if pattern.is_glob() {
        return pattern.expand(project_root);
    }

    let relative = pattern.literal_path();
    let full = project_root.join(&relative);
    let exists = full.symlink_metadata().is_ok();
    if exists {
        // A trailing `/` filters out non-directories; an entry filtered down
        // to nothing counts as missing.
        let expanded = pattern.expand(project_root)?;
        if !expanded.is_empty() {
            return Ok(expanded);
        }
    }
    if entry.optional {
        let reason = if exists {
            "optional directory entry is not a directory in the project root"
        } else {
            "optional entry not present in the project root"
        };
        reporter.report(&SyncEvent::SourceSkipped {
            entry: pattern.as_str().to_owned(),
            reason: reason.into(),
        });
        return Ok(Vec::new());
    }
    Err(SyncError::SourceNotFound {
        entry: pattern.as_str().to_owned(),
        path: full,
    })
}

fn push_unique(
    resolved: &mut Vec<ResolvedPath>,
    seen: &mut HashSet<PathBuf>,
    project_root: &Path,
    relative: PathBuf,
    reporter: &mut dyn Reporter,
) {
    if relative.as_os_str().is_empty() || !seen.insert(relative.clone()) {
        return;
    }
    // Follows symlinks: a link to a file is copied as that file's bytes.
    let kind = match std::fs::metadata(project_root.join(&relative)) {
        Ok(meta) if meta.is_dir() => SourceKind::Directory,
        Ok(meta) if meta.is_file() => SourceKind::File,
        _ => {
            reporter.report(&SyncEvent::SourceSkipped {
                entry: relative.display().to_string(),
                reason: "neither a file nor a directory".into(),
            });
            return;
        }
    };
    resolved.push(ResolvedPath { relative, kind });
}
