//! Error types for Inkdown tooling

use thiserror::Error;

/// Main error type shared across Inkdown crates
#[derive(Error, Debug)]
pub enum InkdownError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Logging setup error
    #[error("Logging error: {0}")]
    Logging(String),
}
