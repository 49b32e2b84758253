//! Inkdown Plugin API
//!
//! The contract between the Inkdown host and third-party plugins. A plugin is
//! a value implementing [`Plugin`]; the host hands it a [`PluginContext`]
//! through which it registers [`Command`]s bound to [`Hotkey`]s.
//!
//! ```
//! use inkdown_plugins_api::{Command, Hotkey, Modifier, Plugin, PluginContext};
//!
//! struct Greeter;
//!
//! impl Plugin for Greeter {
//!     fn on_load(&mut self, ctx: &mut dyn PluginContext) {
//!         ctx.add_command(
//!             Command::new("greet", "Greet", || tracing::info!("hi"))
//!                 .with_hotkey(Hotkey::new([Modifier::Mod], "g")),
//!         );
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod command;
pub mod hotkey;
pub mod plugin;
#[cfg(feature = "testing")]
pub mod testing;

pub use command::{Callback, Command};
pub use hotkey::{Hotkey, HotkeyParseError, Modifier, Platform};
pub use plugin::{Plugin, PluginContext};
