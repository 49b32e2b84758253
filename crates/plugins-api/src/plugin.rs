//! Plugin lifecycle contract
//!
//! The host owns the lifecycle: it constructs the plugin value, calls
//! [`Plugin::on_load`] once with a context carrying its capabilities, and
//! calls [`Plugin::on_unload`] before dropping the value. Whatever the host
//! does with registered commands (uniqueness checks, hotkey dispatch,
//! cleanup on unload) stays on the host side of this boundary.

use crate::command::Command;

/// Capabilities the host exposes to a loading plugin
pub trait PluginContext {
    /// Register a command with the host's command registry.
    ///
    /// Failures such as duplicate ids are handled and reported by the host.
    fn add_command(&mut self, command: Command);
}

/// A unit of third-party code loaded by the host
pub trait Plugin: Send {
    /// Called once when the host activates the plugin
    fn on_load(&mut self, ctx: &mut dyn PluginContext);

    /// Called once before the host drops the plugin
    fn on_unload(&mut self) {}
}
