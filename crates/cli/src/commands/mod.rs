//! Command handlers

pub mod auth;
pub mod plugin;
pub mod theme;

use anyhow::Result;

use crate::cli::{Command, PluginAction, ThemeAction};

/// Run one parsed command to completion
pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Plugin { action } => match action {
            PluginAction::Init {
                path,
                name,
                description,
                force,
            } => plugin::init(&path, name, description, force),
            PluginAction::Validate { path } => plugin::validate(&path),
            PluginAction::Publish { dir, repo } => plugin::publish(&dir, repo.as_deref()).await,
        },
        Command::Theme { action } => match action {
            ThemeAction::Init { path, name, force } => theme::init(&path, name.as_deref(), force),
            ThemeAction::Validate { path } => theme::validate(&path),
        },
        Command::Auth => auth::login().await,
        Command::Logout => auth::logout(),
        Command::Whoami => auth::whoami(),
    }
}
