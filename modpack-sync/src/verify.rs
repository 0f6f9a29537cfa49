//! Post-build verification: SHA-256 comparison of source and destination.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};
use crate::manifest::{ResolvedPath, SourceKind};

/// A destination path that does not mirror its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum VerifyIssue {
    /// Nothing (or the wrong kind of entry) at the destination.
    Missing { path: PathBuf },
    /// File content differs.
    Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// SHA-256 hex digest of a file's contents.
pub fn file_digest(path: &Path) -> Result<String, SyncError> {
    let mut file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| io_err(path, e))?;
    Ok(hex::encode(hasher.finalize()))
}

/// Check every resolved manifest path against its mirror in `mod_directory`.
///
/// Returns an empty vector when the mod directory is an exact mirror.
pub fn verify_mod_directory(
    project_root: &Path,
    mod_directory: &Path,
    resolved: &[ResolvedPath],
) -> Result<Vec<VerifyIssue>, SyncError> {
    let mut issues = Vec::new();

    for item in resolved {
        let destination = mod_directory.join(&item.relative);
        match item.kind {
            SourceKind::Directory => {
                if !destination.is_dir() {
                    issues.push(VerifyIssue::Missing { path: destination });
                }
            }
            SourceKind::File => {
                if !destination.is_file() {
                    issues.push(VerifyIssue::Missing { path: destination });
                    continue;
                }
                let expected = file_digest(&project_root.join(&item.relative))?;
                let actual = file_digest(&destination)?;
                if expected != actual {
                    issues.push(VerifyIssue::Mismatch {
                        path: destination,
                        expected,
                        actual,
                    });
                }
            }
        }
    }

    Ok(issues)
}
