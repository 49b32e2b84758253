//! The `ink` command-line tool
//!
//! Argument parsing, terminal output and the command handlers that drive
//! `inkdown-devkit`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod console;

pub use cli::Cli;
