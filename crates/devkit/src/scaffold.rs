//! Project scaffolding for `ink plugin init` and `ink theme init`
//!
//! The plugin template is the `my-plugin` demo crate compiled into the
//! binary, so the scaffold always matches the plugin API it was built with.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::manifest::{
    slugify, PluginManifest, ThemeManifest, DEFAULT_THEME_MODE, PLUGIN_MANIFEST_FILE,
    THEME_MANIFEST_FILE,
};

/// Display name the template ships with
pub const TEMPLATE_NAME: &str = "My plugin";
/// Package and registry id the template ships with
pub const TEMPLATE_ID: &str = "my-plugin";
/// Description the template ships with
pub const TEMPLATE_DESCRIPTION: &str = "A custom plugin made for inkdown";
/// Theme name used when none is given
pub const DEFAULT_THEME_NAME: &str = "My theme";

const CARGO_TOML: &str = include_str!("../templates/plugin/Cargo.toml.tmpl");
const MANIFEST_JSON: &str = include_str!("../../../demos/plugins/my-plugin/manifest.json");
const LIB_RS: &str = include_str!("../../../demos/plugins/my-plugin/src/lib.rs");
const GITIGNORE: &str = include_str!("../templates/plugin/gitignore");
const DARK_CSS: &str = include_str!("../templates/theme/dark.css");

/// How a template file is rewritten before it is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rewrite {
    Verbatim,
    Manifest,
    CargoToml,
}

struct TemplateFile {
    path: &'static str,
    contents: &'static str,
    rewrite: Rewrite,
}

const PLUGIN_TEMPLATE: &[TemplateFile] = &[
    TemplateFile {
        path: "Cargo.toml",
        contents: CARGO_TOML,
        rewrite: Rewrite::CargoToml,
    },
    TemplateFile {
        path: PLUGIN_MANIFEST_FILE,
        contents: MANIFEST_JSON,
        rewrite: Rewrite::Manifest,
    },
    TemplateFile {
        path: "src/lib.rs",
        contents: LIB_RS,
        rewrite: Rewrite::Verbatim,
    },
    TemplateFile {
        path: ".gitignore",
        contents: GITIGNORE,
        rewrite: Rewrite::Verbatim,
    },
];

/// Errors raised while writing a scaffold
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The target already has a manifest and `force` was not set
    #[error("'{}' already exists; pass --force to overwrite it", .0.display())]
    AlreadyInitialized(PathBuf),

    /// A template file could not be written
    #[error("Failed to write '{path}': {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The embedded template manifest does not parse
    #[error("Template manifest is invalid: {0}")]
    Template(#[from] serde_json::Error),
}

/// Options for `ink plugin init`
#[derive(Debug, Clone, Default)]
pub struct PluginInitOptions {
    /// Display name; the template name is kept when empty
    pub name: Option<String>,
    /// Description; the template description is kept when empty
    pub description: Option<String>,
    /// Overwrite an existing manifest
    pub force: bool,
}

impl PluginInitOptions {
    fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// Write the plugin template into `dest`, returning the files created
pub fn init_plugin(dest: &Path, options: &PluginInitOptions) -> Result<Vec<PathBuf>, ScaffoldError> {
    guard_existing(dest, PLUGIN_MANIFEST_FILE, options.force)?;
    info!("Scaffolding plugin in {}", dest.display());

    let mut written = Vec::with_capacity(PLUGIN_TEMPLATE.len());
    for file in PLUGIN_TEMPLATE {
        let contents = match file.rewrite {
            Rewrite::Verbatim => file.contents.to_string(),
            Rewrite::Manifest => rewrite_manifest(file.contents, options)?,
            Rewrite::CargoToml => rewrite_cargo_toml(file.contents, options),
        };
        written.push(write_file(dest, file.path, &contents)?);
    }

    Ok(written)
}

/// Write `theme.json` and `dark.css` into `dest`, returning the files created
pub fn init_theme(dest: &Path, name: Option<&str>, force: bool) -> Result<Vec<PathBuf>, ScaffoldError> {
    guard_existing(dest, THEME_MANIFEST_FILE, force)?;
    info!("Scaffolding theme in {}", dest.display());

    let theme = ThemeManifest {
        name: name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_THEME_NAME)
            .to_string(),
        version: "1.0.0".to_string(),
        modes: vec![DEFAULT_THEME_MODE.to_string()],
    };
    let manifest = format!("{}\n", serde_json::to_string_pretty(&theme)?);

    Ok(vec![
        write_file(dest, THEME_MANIFEST_FILE, &manifest)?,
        write_file(dest, &format!("{}.css", DEFAULT_THEME_MODE), DARK_CSS)?,
    ])
}

fn guard_existing(dest: &Path, manifest: &str, force: bool) -> Result<(), ScaffoldError> {
    let path = dest.join(manifest);
    if path.exists() && !force {
        return Err(ScaffoldError::AlreadyInitialized(path));
    }
    Ok(())
}

fn rewrite_manifest(template: &str, options: &PluginInitOptions) -> Result<String, ScaffoldError> {
    let mut manifest: PluginManifest = serde_json::from_str(template)?;
    if let Some(name) = options.name() {
        manifest.name = name.to_string();
        manifest.id = Some(slugify(name));
    }
    if let Some(description) = options.description() {
        manifest.description = description.to_string();
    }
    Ok(format!("{}\n", serde_json::to_string_pretty(&manifest)?))
}

fn rewrite_cargo_toml(template: &str, options: &PluginInitOptions) -> String {
    let mut contents = template.to_string();
    if let Some(name) = options.name() {
        contents = contents.replace(&toml_quote(TEMPLATE_ID), &toml_quote(&slugify(name)));
    }
    if let Some(description) = options.description() {
        contents = contents.replace(&toml_quote(TEMPLATE_DESCRIPTION), &toml_quote(description));
    }
    contents
}

fn toml_quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn write_file(dest: &Path, relative: &str, contents: &str) -> Result<PathBuf, ScaffoldError> {
    let path = dest.join(relative);
    let io_err = |source| ScaffoldError::Io {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&path, contents).map_err(io_err)?;

    debug!("Wrote {}", path.display());
    Ok(path)
}
