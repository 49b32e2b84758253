//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inkdown_core::logging::{cli_config, LogLevel, LoggingConfig};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ink")]
#[command(about = "Create, validate and publish Inkdown plugins and themes")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Manage plugins
    Plugin {
        /// Plugin subcommand action
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Manage themes
    Theme {
        /// Theme subcommand action
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Log in to your Inkdown account
    Auth,
    /// Remove stored Inkdown credentials
    Logout,
    /// Show the logged-in account
    Whoami,
}

/// Plugin subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum PluginAction {
    /// Create a new plugin from the template
    Init {
        /// Directory to create the plugin in
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Plugin display name
        #[arg(short, long)]
        name: Option<String>,
        /// Plugin description
        #[arg(short, long)]
        description: Option<String>,
        /// Overwrite an existing manifest.json
        #[arg(long)]
        force: bool,
    },
    /// Check a plugin for problems before publishing
    Validate {
        /// Plugin directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
    /// Build, release on GitHub and submit to the community registry
    Publish {
        /// Plugin directory
        #[arg(short = 'd', long = "dir", default_value = ".")]
        dir: PathBuf,
        /// GitHub repository to release to (`owner/name`), instead of the `origin` remote
        #[arg(long, value_name = "OWNER/NAME")]
        repo: Option<String>,
    },
}

/// Theme subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ThemeAction {
    /// Create a new theme
    Init {
        /// Directory to create the theme in
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Theme display name
        #[arg(short, long)]
        name: Option<String>,
        /// Overwrite an existing theme.json
        #[arg(long)]
        force: bool,
    },
    /// Check a theme for problems
    Validate {
        /// Theme directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

impl Cli {
    /// Logging setup for this run.
    ///
    /// Starts from the config file's `logging` section (or the quiet CLI
    /// preset); `--verbose` raises the level to debug and `--log-level` wins
    /// over both.
    pub fn logging_config(&self, from_file: Option<LoggingConfig>) -> LoggingConfig {
        let mut config = from_file.unwrap_or_else(cli_config);
        if self.verbose {
            config.global_level = LogLevel::Debug;
        }
        if let Some(level) = self.log_level {
            config.global_level = level;
        }
        config
    }
}
