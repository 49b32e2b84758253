//! `ink theme` handlers

use std::path::Path;

use anyhow::{bail, Context, Result};
use inkdown_devkit::scaffold;
use inkdown_devkit::validate::{resolve_project_dir, validate_theme};

use crate::console;

/// `ink theme init`
pub fn init(path: &Path, name: Option<&str>, force: bool) -> Result<()> {
    let written = scaffold::init_theme(path, name, force).context("Failed to create theme")?;
    for file in &written {
        console::note(&format!("  created {}", file.display()));
    }
    console::success(&format!("Theme created in {}", path.display()));
    Ok(())
}

/// `ink theme validate`
pub fn validate(path: &Path) -> Result<()> {
    let dir = resolve_project_dir(path)?;
    console::info(&format!("Validating theme in: {}", dir.display()));

    let report = validate_theme(&dir);
    console::print_report(&report);
    if !report.passed() {
        bail!("theme validation failed");
    }

    console::success("Theme validation passed!");
    Ok(())
}
