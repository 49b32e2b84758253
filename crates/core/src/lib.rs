//! Inkdown Core
//!
//! Shared error and logging infrastructure for the Inkdown plugin kit.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::InkdownError;

/// Core result type for Inkdown tooling operations
pub type Result<T> = std::result::Result<T, InkdownError>;

/// Version information for the Inkdown plugin kit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
