//! Build configuration.
//!
//! # Storage layout
//!
//! ```text
//! <project_root>/
//!   modpack.yaml      (optional; every field falls back to a default)
//!   About/ Assemblies/ Defs/ Languages/ Textures/ ...
//! ```
//!
//! # API pattern
//!
//! - [`load_at`]: reads `<project_root>/modpack.yaml`; a missing file yields
//!   the default layout.
//! - [`load_file`]: reads an explicit config path; a missing file is an error.
//!
//! Both return a validated [`BuildConfig`].

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ClearMode, FolderName, ManifestEntry, ManifestStrategy, ModName};

/// File name looked up under the project root by [`load_at`].
pub const CONFIG_FILE_NAME: &str = "modpack.yaml";

/// Top-level folders the build owns unless configured otherwise.
pub const DEFAULT_RELEVANT_FOLDERS: &[&str] = &["Defs", "Assemblies", "About", "Textures", "Languages"];

/// Placeholder substituted with the mod name inside manifest entries.
pub const MOD_NAME_PLACEHOLDER: &str = "{mod_name}";

// ---------------------------------------------------------------------------
// 1. On-disk shape
// ---------------------------------------------------------------------------

/// `modpack.yaml` as written by the user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_name: Option<ModName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_folders: Option<Vec<FolderName>>,
    pub clear_mode: ClearMode,
    pub manifest: ManifestSection,
}

/// The `manifest:` block of `modpack.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSection {
    pub strategy: ManifestStrategy,
    /// Entries for the `patterns` strategy. `None` selects the default manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<ManifestEntry>>,
}

// ---------------------------------------------------------------------------
// 2. Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved and validated configuration for one build run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    pub mod_name: ModName,
    /// Ordered; clearing visits folders in this order.
    pub relevant_folders: Vec<FolderName>,
    pub clear_mode: ClearMode,
    pub strategy: ManifestStrategy,
    /// Manifest entries with [`MOD_NAME_PLACEHOLDER`] already substituted.
    /// Ignored by the `whole-folders` strategy.
    pub entries: Vec<ManifestEntry>,
}

impl BuildConfig {
    /// The default layout for `mod_name`.
    pub fn defaults_for(mod_name: ModName) -> Result<Self, ConfigError> {
        let config = Self {
            entries: default_manifest_entries(&mod_name),
            mod_name,
            relevant_folders: DEFAULT_RELEVANT_FOLDERS
                .iter()
                .map(|name| FolderName::from(*name))
                .collect(),
            clear_mode: ClearMode::default(),
            strategy: ManifestStrategy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Resolve a parsed config file against the project root it belongs to.
    pub fn from_file(file: ConfigFile, project_root: &Path) -> Result<Self, ConfigError> {
        let mod_name = match file.mod_name {
            Some(name) => name,
            None => mod_name_from_root(project_root)?,
        };
        let relevant_folders = file.relevant_folders.unwrap_or_else(|| {
            DEFAULT_RELEVANT_FOLDERS
                .iter()
                .map(|name| FolderName::from(*name))
                .collect()
        });
        let entries = match file.manifest.entries {
            Some(entries) => entries
                .into_iter()
                .map(|entry| ManifestEntry {
                    path: entry.path.replace(MOD_NAME_PLACEHOLDER, &mod_name.0),
                    optional: entry.optional,
                })
                .collect(),
            None => default_manifest_entries(&mod_name),
        };

        let config = Self {
            mod_name,
            relevant_folders,
            clear_mode: file.clear_mode,
            strategy: file.manifest.strategy,
            entries,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every name and pattern.
    ///
    /// Folder names and the mod name must be single plain path components so
    /// that deletion can never reach outside the mod directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(reason) = check_component(&self.mod_name.0) {
            return Err(ConfigError::InvalidModName {
                name: self.mod_name.0.clone(),
                reason,
            });
        }

        let mut seen = HashSet::new();
        for folder in &self.relevant_folders {
            if let Err(reason) = check_component(&folder.0) {
                return Err(ConfigError::InvalidFolderName {
                    name: folder.0.clone(),
                    reason,
                });
            }
            if !seen.insert(folder.0.as_str()) {
                return Err(ConfigError::DuplicateFolder {
                    name: folder.0.clone(),
                });
            }
        }

        for entry in &self.entries {
            validate_pattern(&entry.path)?;
        }
        Ok(())
    }
}

/// The default copy manifest: mod metadata, the mod assembly, and every
/// definition, language and texture file.
pub fn default_manifest_entries(mod_name: &ModName) -> Vec<ManifestEntry> {
    vec![
        ManifestEntry::required("About/"),
        ManifestEntry::required("About/About.xml"),
        ManifestEntry::optional("About/Preview.png"),
        ManifestEntry::required("Assemblies/"),
        ManifestEntry::required(format!("Assemblies/{mod_name}.dll")),
        ManifestEntry::required("Defs/**"),
        ManifestEntry::required("Languages/**"),
        ManifestEntry::required("Textures/**"),
    ]
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<project_root>/modpack.yaml`, falling back to defaults when absent.
pub fn load_at(project_root: &Path) -> Result<BuildConfig, ConfigError> {
    let path = project_root.join(CONFIG_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse(&contents, &path, project_root),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            BuildConfig::from_file(ConfigFile::default(), project_root)
        }
        Err(source) => Err(ConfigError::Io { path, source }),
    }
}

/// Load an explicit config file. Returns `ConfigError::Io` if it is missing.
pub fn load_file(path: &Path, project_root: &Path) -> Result<BuildConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, path, project_root)
}

fn parse(contents: &str, path: &Path, project_root: &Path) -> Result<BuildConfig, ConfigError> {
    // An empty file is a valid "all defaults" config.
    let file = if contents.trim().is_empty() {
        ConfigFile::default()
    } else {
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    };
    BuildConfig::from_file(file, project_root)
}

// ---------------------------------------------------------------------------
// 4. Validation helpers
// ---------------------------------------------------------------------------

/// Reject manifest patterns that are absolute or climb out of the project root.
pub fn validate_pattern(pattern: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason,
    };

    if pattern.trim().is_empty() {
        return Err(invalid("pattern is empty"));
    }
    if pattern.starts_with(['/', '\\']) || Path::new(pattern).is_absolute() {
        return Err(invalid("pattern must be relative to the project root"));
    }
    if pattern.split(['/', '\\']).any(|part| part == "..") {
        return Err(invalid("pattern must not contain '..'"));
    }
    Ok(())
}

fn check_component(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name == "." || name == ".." {
        return Err("name must not be '.' or '..'");
    }
    if name.contains(['/', '\\']) {
        return Err("name must be a single path component");
    }
    Ok(())
}

fn mod_name_from_root(project_root: &Path) -> Result<ModName, ConfigError> {
    project_root
        .file_name()
        .and_then(|name| name.to_str())
        .map(ModName::from)
        .ok_or_else(|| ConfigError::InvalidModName {
            name: project_root.display().to_string(),
            reason: "project root has no usable final component; set `mod_name`",
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
