//! Keyboard shortcuts.
//!
//! ## Learning: Normalising Input Before Lookup
//!
//! The same shortcut arrives in several shapes: `Ctrl+Z` on Linux,
//! `Cmd+Z` on macOS, `Ctrl+Shift+Z` with the key reported as `'Z'`. The
//! keymap normalises a [`KeyCombo`] once (meta folds into ctrl, the key is
//! lower-cased) and then does a plain hash lookup.

use crate::config::Config;
use crate::{CoreError, CoreResult};
use std::collections::HashMap;
use std::str::FromStr;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool, // Cmd on macOS, Win on Windows
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl modifier.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Meta (Cmd/Win) modifier.
    pub const META: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };

    /// Ctrl+Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Returns true if no modifiers are pressed.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.shift && !self.meta
    }

    /// Parses modifiers from a string like "ctrl+shift".
    pub fn parse(s: &str) -> Self {
        let mut mods = Modifiers::NONE;
        for part in s.split('+').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "alt" | "option" => mods.alt = true,
                "shift" => mods.shift = true,
                "meta" | "cmd" | "win" | "super" => mods.meta = true,
                _ => {}
            }
        }
        mods
    }

    /// Meta counts as Ctrl so one binding serves both platforms.
    fn normalized(self) -> Self {
        Self {
            ctrl: self.ctrl || self.meta,
            meta: false,
            ..self
        }
    }
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.alt {
            parts.push("Alt");
        }
        if self.shift {
            parts.push("Shift");
        }
        if self.meta {
            #[cfg(target_os = "macos")]
            parts.push("Cmd");
            #[cfg(not(target_os = "macos"))]
            parts.push("Win");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key press: one character plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: char,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Ctrl plus a key.
    pub fn ctrl(key: char) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    /// Parses a combo string like "Ctrl+Shift+Z".
    pub fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };
        let mut chars = key.trim().chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(key, Modifiers::parse(mods)))
    }

    fn normalized(self) -> Self {
        Self {
            key: self.key.to_ascii_lowercase(),
            modifiers: self.modifiers.normalized(),
        }
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = self.key.to_ascii_uppercase();
        if self.modifiers.is_empty() {
            write!(f, "{key}")
        } else {
            write!(f, "{}+{key}", self.modifiers)
        }
    }
}

/// Actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    Undo,
    Redo,
    /// Needs a name from the user, so the session hands it back to the caller
    SaveTemplate,
    CopySelected,
    Paste,
}

impl Shortcut {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::SaveTemplate => "save-template",
            Self::CopySelected => "copy",
            Self::Paste => "paste",
        }
    }
}

impl FromStr for Shortcut {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "undo" => Ok(Self::Undo),
            "redo" => Ok(Self::Redo),
            "save-template" => Ok(Self::SaveTemplate),
            "copy" => Ok(Self::CopySelected),
            "paste" => Ok(Self::Paste),
            other => Err(CoreError::validation(format!("Unknown shortcut: {other}"))),
        }
    }
}

/// Maps key combos to shortcuts.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, Shortcut>,
}

impl Keymap {
    /// Creates a keymap with the default bindings.
    pub fn new() -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
        };
        keymap.add_default_bindings();
        keymap
    }

    /// Creates a keymap from configuration.
    ///
    /// Bindings that fail to parse are skipped with a warning.
    pub fn from_config(config: &Config) -> Self {
        let mut keymap = Self::new();

        for (combo_str, shortcut_str) in &config.keyboard.bindings {
            if let Err(e) = keymap.bind_str(combo_str, shortcut_str) {
                tracing::warn!("Ignoring key binding {}: {}", combo_str, e);
            }
        }

        keymap
    }

    fn add_default_bindings(&mut self) {
        let bindings = [
            (KeyCombo::ctrl('z'), Shortcut::Undo),
            (KeyCombo::ctrl('y'), Shortcut::Redo),
            (KeyCombo::new('z', Modifiers::CTRL_SHIFT), Shortcut::Redo),
            (KeyCombo::ctrl('s'), Shortcut::SaveTemplate),
            (KeyCombo::ctrl('c'), Shortcut::CopySelected),
            (KeyCombo::ctrl('v'), Shortcut::Paste),
        ];
        for (combo, shortcut) in bindings {
            self.bind(combo, shortcut);
        }
    }

    /// Adds or replaces a binding.
    pub fn bind(&mut self, combo: KeyCombo, shortcut: Shortcut) {
        self.bindings.insert(combo.normalized(), shortcut);
    }

    /// Adds a binding from its textual form.
    pub fn bind_str(&mut self, combo: &str, shortcut: &str) -> CoreResult<()> {
        let combo = KeyCombo::parse(combo)
            .ok_or_else(|| CoreError::validation(format!("Invalid key combo: {combo}")))?;
        self.bind(combo, shortcut.parse()?);
        Ok(())
    }

    /// Looks a key press up.
    pub fn resolve(&self, combo: &KeyCombo) -> Option<Shortcut> {
        self.bindings.get(&combo.normalized()).copied()
    }

    /// Returns every binding, sorted for display.
    pub fn bindings(&self) -> Vec<(KeyCombo, Shortcut)> {
        let mut all: Vec<_> = self.bindings.iter().map(|(k, v)| (*k, *v)).collect();
        all.sort_by_key(|(combo, _)| combo.to_string());
        all
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_parse() {
        let combo = KeyCombo::parse("Ctrl+Shift+Z").unwrap();
        assert_eq!(combo.key, 'Z');
        assert!(combo.modifiers.ctrl && combo.modifiers.shift);

        assert_eq!(KeyCombo::parse("v"), Some(KeyCombo::new('v', Modifiers::NONE)));
        assert!(KeyCombo::parse("Ctrl+Enter").is_none());
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve(&KeyCombo::ctrl('z')), Some(Shortcut::Undo));
        assert_eq!(keymap.resolve(&KeyCombo::ctrl('y')), Some(Shortcut::Redo));
        assert_eq!(
            keymap.resolve(&KeyCombo::new('Z', Modifiers::CTRL_SHIFT)),
            Some(Shortcut::Redo)
        );
        assert_eq!(keymap.resolve(&KeyCombo::ctrl('s')), Some(Shortcut::SaveTemplate));
        assert_eq!(keymap.resolve(&KeyCombo::new('z', Modifiers::NONE)), None);
    }

    #[test]
    fn test_meta_acts_as_ctrl() {
        let keymap = Keymap::new();
        assert_eq!(
            keymap.resolve(&KeyCombo::new('c', Modifiers::META)),
            Some(Shortcut::CopySelected)
        );
    }

    #[test]
    fn test_config_overrides() {
        let mut config = Config::default();
        config
            .keyboard
            .bindings
            .insert("Ctrl+Y".to_string(), "paste".to_string());
        config
            .keyboard
            .bindings
            .insert("Ctrl+Q".to_string(), "explode".to_string());

        let keymap = Keymap::from_config(&config);
        assert_eq!(keymap.resolve(&KeyCombo::ctrl('y')), Some(Shortcut::Paste));
        assert_eq!(keymap.resolve(&KeyCombo::ctrl('q')), None);
    }
}
