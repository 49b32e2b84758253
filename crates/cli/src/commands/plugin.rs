//! `ink plugin` handlers

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use inkdown_config::{Env, TokenStore};
use inkdown_devkit::publish::parse_remote_url;
use inkdown_devkit::scaffold::{self, PluginInitOptions};
use inkdown_devkit::validate::{resolve_project_dir, validate_plugin};
use inkdown_devkit::{PublishOutcome, Publisher};

use crate::console::{self, Console};

/// `ink plugin init`
pub fn init(path: &Path, name: Option<String>, description: Option<String>, force: bool) -> Result<()> {
    let options = PluginInitOptions {
        name,
        description,
        force,
    };
    let written = scaffold::init_plugin(path, &options).context("Failed to create plugin")?;

    for file in &written {
        console::note(&format!("  created {}", file.display()));
    }
    console::success(&format!("Plugin created in {}", path.display()));
    console::info("Next: edit src/lib.rs, then run 'ink plugin validate'.");
    Ok(())
}

/// `ink plugin validate`
pub fn validate(path: &Path) -> Result<()> {
    let dir = resolve_project_dir(path)?;
    console::info(&format!("Validating plugin in: {}", dir.display()));

    let report = validate_plugin(&dir);
    console::print_report(&report);
    if !report.passed() {
        bail!("plugin validation failed");
    }

    console::success("Plugin validation passed!");
    Ok(())
}

/// `ink plugin publish`
pub async fn publish(dir: &Path, repo: Option<&str>) -> Result<()> {
    let dir = resolve_project_dir(dir)?;
    let mut publisher = Publisher::new(Env::load(), TokenStore::open()?);
    if let Some(repo) = repo {
        let (owner, name) = parse_remote_url(repo)
            .ok_or_else(|| anyhow!("Expected --repo as owner/name, got '{}'", repo))?;
        publisher = publisher.with_repository(owner, name);
    }

    match publisher.publish(&dir, &mut Console).await? {
        PublishOutcome::Published { pull_request_url } => {
            console::success(&format!("Pull request created: {}", pull_request_url));
        }
        PublishOutcome::Aborted => {}
    }
    Ok(())
}
