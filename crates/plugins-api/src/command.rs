//! Command descriptors registered by plugins

use std::fmt;
use std::sync::Arc;

use crate::hotkey::{Hotkey, Platform};

/// Zero-argument procedure run when the user activates a command
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// A named, invokable action a plugin hands to the host.
///
/// The `id` must be unique within the host's command registry; the host
/// enforces that, not the plugin.
#[derive(Clone)]
pub struct Command {
    /// Unique identifier within the host registry
    pub id: String,
    /// Display name shown in the command palette
    pub name: String,
    /// Ordered hotkey bindings
    pub hotkeys: Vec<Hotkey>,
    callback: Callback,
}

impl Command {
    /// Create a command without hotkeys
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hotkeys: Vec::new(),
            callback: Arc::new(callback),
        }
    }

    /// Append a hotkey binding
    pub fn with_hotkey(mut self, hotkey: Hotkey) -> Self {
        self.hotkeys.push(hotkey);
        self
    }

    /// Append several hotkey bindings, keeping their order
    pub fn with_hotkeys(mut self, hotkeys: impl IntoIterator<Item = Hotkey>) -> Self {
        self.hotkeys.extend(hotkeys);
        self
    }

    /// Run the callback
    pub fn invoke(&self) {
        (self.callback)();
    }

    /// Shared handle to the callback, for hosts that dispatch elsewhere
    pub fn callback(&self) -> Callback {
        Arc::clone(&self.callback)
    }

    /// Check whether any binding equals `hotkey`
    pub fn is_bound_to(&self, hotkey: &Hotkey) -> bool {
        self.hotkeys.iter().any(|h| h == hotkey)
    }

    /// Palette label, e.g. `Just say hello (Ctrl+Shift+H)`
    pub fn display_string(&self, platform: Platform) -> String {
        match self.hotkeys.first() {
            Some(hotkey) => format!("{} ({})", self.name, hotkey.display_for(platform)),
            None => self.name.clone(),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("hotkeys", &self.hotkeys)
            .finish_non_exhaustive()
    }
}
