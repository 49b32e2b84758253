//! Hotkey bindings for plugin commands
//!
//! A binding pairs a set of modifiers with one trigger key. Bindings use the
//! host's JSON shape (`{"modifiers": ["Mod", "Shift"], "key": "h"}`) and the
//! textual form `Mod+Shift+h`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Modifier keys recognized by the host.
///
/// The derived ordering is the canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Platform primary modifier: Cmd on macOS, Ctrl elsewhere
    Mod,
    /// Control key
    Ctrl,
    /// Meta key (Cmd on macOS, Win/Super elsewhere)
    Meta,
    /// Alt key (Option on macOS)
    Alt,
    /// Shift key
    Shift,
}

/// Operating system family, used to render `Mod` for humans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// macOS
    MacOs,
    /// Windows
    Windows,
    /// Linux and other unix desktops
    Linux,
}

/// A single hotkey binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hotkey {
    /// Modifiers that must be held
    pub modifiers: BTreeSet<Modifier>,
    /// Trigger key
    pub key: String,
}

/// Errors from parsing the textual hotkey form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyParseError {
    /// The text is empty or ends in a single `+`
    #[error("hotkey has no trigger key")]
    EmptyKey,

    /// A segment before the key is not a modifier name
    #[error("unknown modifier: {0}")]
    UnknownModifier(String),

    /// The same modifier appears more than once
    #[error("modifier listed twice: {0}")]
    DuplicateModifier(Modifier),
}

impl Modifier {
    /// Resolve `Mod` to the physical modifier used on `platform`
    pub fn resolve(self, platform: Platform) -> Modifier {
        match (self, platform) {
            (Modifier::Mod, Platform::MacOs) => Modifier::Meta,
            (Modifier::Mod, _) => Modifier::Ctrl,
            (other, _) => other,
        }
    }

    /// Human-readable label on `platform`
    pub fn label(self, platform: Platform) -> &'static str {
        match (self.resolve(platform), platform) {
            (Modifier::Ctrl, _) => "Ctrl",
            (Modifier::Meta, Platform::MacOs) => "Cmd",
            (Modifier::Meta, Platform::Windows) => "Win",
            (Modifier::Meta, Platform::Linux) => "Super",
            (Modifier::Alt, Platform::MacOs) => "Option",
            (Modifier::Alt, _) => "Alt",
            (Modifier::Shift, _) => "Shift",
            (Modifier::Mod, _) => "Mod",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modifier::Mod => "Mod",
            Modifier::Ctrl => "Ctrl",
            Modifier::Meta => "Meta",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
        };
        f.write_str(name)
    }
}

impl FromStr for Modifier {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mod" => Ok(Modifier::Mod),
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "meta" | "cmd" | "command" | "super" | "win" => Ok(Modifier::Meta),
            "alt" | "option" | "opt" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            _ => Err(HotkeyParseError::UnknownModifier(s.trim().to_string())),
        }
    }
}

impl Platform {
    /// The platform this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

impl Hotkey {
    /// Create a binding from modifiers and a trigger key
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: impl Into<String>) -> Self {
        Self {
            modifiers: modifiers.into_iter().collect(),
            key: key.into(),
        }
    }

    /// Check whether a modifier is part of this binding
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Render the binding for users of `platform`, e.g. `Cmd+Shift+H`
    pub fn display_for(&self, platform: Platform) -> String {
        let resolved: BTreeSet<Modifier> =
            self.modifiers.iter().map(|m| m.resolve(platform)).collect();

        let mut parts: Vec<String> = resolved
            .into_iter()
            .map(|m| m.label(platform).to_string())
            .collect();

        let key = if self.key.chars().count() == 1 {
            self.key.to_uppercase()
        } else {
            self.key.clone()
        };
        parts.push(key);

        parts.join("+")
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}+", modifier)?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // A trailing "++" means the trigger key is '+' itself
        let (modifier_part, key) = if s == "+" {
            ("", "+")
        } else if let Some(rest) = s.strip_suffix("++") {
            (rest, "+")
        } else {
            match s.rsplit_once('+') {
                Some((mods, key)) => (mods, key.trim()),
                None => ("", s),
            }
        };

        if key.is_empty() {
            return Err(HotkeyParseError::EmptyKey);
        }

        let mut modifiers = BTreeSet::new();
        for part in modifier_part.split('+').filter(|p| !p.trim().is_empty()) {
            let modifier: Modifier = part.parse()?;
            if !modifiers.insert(modifier) {
                return Err(HotkeyParseError::DuplicateModifier(modifier));
            }
        }

        Ok(Self {
            modifiers,
            key: key.to_string(),
        })
    }
}
