//! Inkdown developer kit
//!
//! Everything behind the `ink` binary that is not terminal handling:
//! manifests, project templates, static validation, the community registry
//! format and the network clients used to publish.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod account;
pub mod github;
pub mod manifest;
pub mod publish;
pub mod registry;
pub mod scaffold;
pub mod validate;

#[cfg(test)]
mod test_server;

pub use manifest::{PluginManifest, ThemeManifest};
pub use publish::{PublishOutcome, PublishUi, Publisher};
pub use validate::{Diagnostic, Severity, ValidationReport};
