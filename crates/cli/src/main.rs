//! `ink` binary
//!
//! Entry point for the Inkdown plugin and theme developer tool.

use std::process::ExitCode;

use clap::Parser;
use inkdown_cli::{commands, console, Cli};
use inkdown_config::CliConfig;
use inkdown_core::logging;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config errors surface in the commands that read the file
    let from_file = CliConfig::load().ok().and_then(|config| config.logging);
    let logging_config = cli.logging_config(from_file);
    if let Err(err) = logging::init_logging(&logging_config) {
        console::warn(&format!("Failed to initialize logging: {}", err));
    }

    info!(version = inkdown_core::VERSION, "Starting ink");
    debug!(command = ?cli.command, config = ?logging_config, "Parsed arguments");

    match commands::run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            console::error(&format!("Error: {:#}", err));
            ExitCode::FAILURE
        }
    }
}
