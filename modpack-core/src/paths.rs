//! Per-run path resolution.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::types::ModName;

/// Default output folder name under the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// The three roots every run works with, resolved once up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPaths {
    /// Directory holding the mod source payload. Read-only during a run.
    pub project_root: PathBuf,
    /// Directory that will contain the packaged mod.
    pub output_root: PathBuf,
    /// `output_root/<mod_name>`; the target of every clear and copy.
    pub mod_directory: PathBuf,
    /// `true` when no output was given and [`DEFAULT_OUTPUT_DIR`] was used.
    pub output_auto_selected: bool,
}

impl BuildPaths {
    /// Resolve the run's paths.
    ///
    /// A relative `output` is taken relative to `cwd` (the invoking working
    /// directory), not the project root. Nothing is created or canonicalized.
    pub fn resolve(
        project_root: &Path,
        output: Option<&Path>,
        cwd: &Path,
        mod_name: &ModName,
    ) -> Self {
        let (output_root, output_auto_selected) = match output {
            Some(path) if path.is_absolute() => (path.to_path_buf(), false),
            Some(path) => (cwd.join(path), false),
            None => (project_root.join(DEFAULT_OUTPUT_DIR), true),
        };
        let mod_directory = output_root.join(&mod_name.0);
        Self {
            project_root: project_root.to_path_buf(),
            output_root,
            mod_directory,
            output_auto_selected,
        }
    }
}
