//! Plugin and theme manifest parsing
//!
//! Plugins describe themselves in `manifest.json`, themes in `theme.json`.
//! Parsing is lenient about missing fields so validation can report every
//! gap at once instead of stopping at the first serde error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of a plugin manifest
pub const PLUGIN_MANIFEST_FILE: &str = "manifest.json";
/// File name of a theme manifest
pub const THEME_MANIFEST_FILE: &str = "theme.json";
/// Artifact a plugin ships when its manifest does not name one
pub const DEFAULT_MAIN: &str = "main.js";
/// Mode assumed when a theme lists none
pub const DEFAULT_THEME_MODE: &str = "dark";

/// Plugin manifest loaded from `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PluginManifest {
    /// Registry id; derived from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Release version
    #[serde(default)]
    pub version: String,
    /// Short description, used as the release body
    #[serde(default)]
    pub description: String,
    /// Author shown in the community registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Built artifact the host loads
    #[serde(default = "default_main")]
    pub main: String,
}

/// Theme manifest loaded from `theme.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeManifest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Release version
    #[serde(default)]
    pub version: String,
    /// Color modes; each needs a `<mode>.css` file
    #[serde(default)]
    pub modes: Vec<String>,
}

/// Errors that can occur while loading a manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest file in the project directory
    #[error("Missing '{}'", .0.display())]
    NotFound(PathBuf),

    /// The manifest exists but could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid JSON for its type
    #[error("Invalid '{file}': {source}")]
    Parse {
        /// Manifest file name
        file: &'static str,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// A field publishing needs is empty
    #[error("{file} missing '{field}'")]
    MissingField {
        /// Manifest file name
        file: &'static str,
        /// Empty field
        field: &'static str,
    },
}

fn default_main() -> String {
    DEFAULT_MAIN.to_string()
}

fn read_manifest<T: for<'de> Deserialize<'de>>(
    dir: &Path,
    file: &'static str,
) -> Result<T, ManifestError> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(ManifestError::NotFound(PathBuf::from(file)));
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        path: path.clone(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ManifestError::Parse { file, source })
}

impl PluginManifest {
    /// Parse `manifest.json` in `dir` without checking required fields
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        read_manifest(dir, PLUGIN_MANIFEST_FILE)
    }

    /// Parse and require `name` and `version`
    pub fn load_checked(dir: &Path) -> Result<Self, ManifestError> {
        let manifest = Self::load(dir)?;
        if let Some(&field) = manifest.missing_fields().first() {
            return Err(ManifestError::MissingField {
                file: PLUGIN_MANIFEST_FILE,
                field,
            });
        }
        Ok(manifest)
    }

    /// A manifest with the given name and version, other fields defaulted
    pub fn minimal(name: &str, version: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
            author: None,
            main: default_main(),
        }
    }

    /// Required fields that are empty, in report order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.version.trim().is_empty() {
            missing.push("version");
        }
        missing
    }

    /// Registry id: the explicit `id`, else the slugified name
    pub fn slug(&self) -> String {
        match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => slugify(&self.name),
        }
    }

    /// Git tag for this version, `v`-prefixed exactly once
    pub fn tag_name(&self) -> String {
        if self.version.starts_with('v') {
            self.version.clone()
        } else {
            format!("v{}", self.version)
        }
    }

    /// Get the plugin's display name
    pub fn display_name(&self) -> String {
        format!("{} v{}", self.name, self.version.trim_start_matches('v'))
    }
}

impl ThemeManifest {
    /// Parse `theme.json` in `dir`
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        read_manifest(dir, THEME_MANIFEST_FILE)
    }

    /// Required fields that are empty, in report order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.version.trim().is_empty() {
            missing.push("version");
        }
        missing
    }

    /// Declared modes, or the default mode when none are declared
    pub fn effective_modes(&self) -> Vec<String> {
        if self.modes.is_empty() {
            vec![DEFAULT_THEME_MODE.to_string()]
        } else {
            self.modes.clone()
        }
    }
}

/// Lowercase a display name and replace spaces with hyphens
pub fn slugify(name: &str) -> String {
    name.replace(' ', "-").to_lowercase()
}

/// Check a `MAJOR.MINOR[.PATCH]` version, optionally `v`-prefixed
pub fn is_valid_version(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() >= 2 && parts.len() <= 3 && parts.iter().all(|part| part.parse::<u32>().is_ok())
}
