//! Domain types for modpack builds.
//!
//! All types are serializable/deserializable via serde + serde_yaml so they
//! can appear directly in `modpack.yaml`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The name of the packaged mod; also the name of the mod directory inside
/// the output root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModName(pub String);

impl fmt::Display for ModName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ModName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ModName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A top-level folder name owned by the build (e.g. `Defs`).
///
/// Only folders named here are ever deleted from the mod directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderName(pub String);

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FolderName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FolderName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<std::path::Path> for FolderName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What happens to a relevant folder that exists but is already empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ClearMode {
    /// Leave the empty directory in place.
    #[default]
    KeepEmpty,
    /// Remove the empty directory as well.
    RemoveEmpty,
}

impl fmt::Display for ClearMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearMode::KeepEmpty => write!(f, "keep-empty"),
            ClearMode::RemoveEmpty => write!(f, "remove-empty"),
        }
    }
}

/// How the copy manifest is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestStrategy {
    /// Copy exactly the configured entries (files, folders, glob patterns).
    #[default]
    Patterns,
    /// Copy every relevant folder's whole subtree.
    WholeFolders,
}

impl fmt::Display for ManifestStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestStrategy::Patterns => write!(f, "patterns"),
            ManifestStrategy::WholeFolders => write!(f, "whole-folders"),
        }
    }
}

// ---------------------------------------------------------------------------
// Manifest entries
// ---------------------------------------------------------------------------

/// One source-relative path or glob pattern in the copy manifest.
///
/// In YAML an entry is either a bare string (`Defs/**`) or a mapping
/// (`{ path: About/Preview.png, optional: true }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ManifestEntryCompat")]
pub struct ManifestEntry {
    pub path: String,
    /// A missing exact path is skipped with a warning instead of failing.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestEntryCompat {
    Bare(String),
    Detailed {
        path: String,
        #[serde(default)]
        optional: bool,
    },
}

impl From<ManifestEntryCompat> for ManifestEntry {
    fn from(compat: ManifestEntryCompat) -> Self {
        match compat {
            ManifestEntryCompat::Bare(path) => Self {
                path,
                optional: false,
            },
            ManifestEntryCompat::Detailed { path, optional } => Self { path, optional },
        }
    }
}

impl ManifestEntry {
    /// A required entry.
    pub fn required(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            optional: false,
        }
    }

    /// An entry whose absence from the source tree is tolerated.
    pub fn optional(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            optional: true,
        }
    }
}

impl fmt::Display for ManifestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
