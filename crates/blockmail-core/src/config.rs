//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! Serde is Rust's standard for serialization/deserialization.
//! The `#[derive(Serialize, Deserialize)]` macro generates
//! code to convert structs to/from JSON, TOML, etc.
//!
//! `#[serde(default)]` uses Default::default() for missing fields,
//! making configs backward-compatible: a file that only sets
//! `[export] title = "Weekly digest"` is a complete config.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "blockmail";

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing behavior
    pub editor: EditorConfig,

    /// Save-status indicator timings
    pub status: StatusConfig,

    /// Where documents and templates live
    pub storage: StorageConfig,

    /// HTML export scaffold
    pub export: ExportConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from the default location.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads from the default config path.
    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join("config.toml"))
    }

    /// Saves the config to the given path.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }
}

/// Editing behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of undo snapshots kept
    pub history_limit: usize,

    /// Quiet period before a field edit is written to storage
    pub autosave_delay_ms: u64,

    /// Start from header/hero/footer when nothing is stored
    pub seed_starter_document: bool,
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: blockmail_history::DEFAULT_MAX_SIZE,
            autosave_delay_ms: 1000,
            seed_starter_document: true,
        }
    }
}

/// Save-status indicator timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// How long "Saving..." shows before "Saved"
    pub saving_ms: u64,

    /// How long "Saved" stays before the indicator hides
    pub saved_visible_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            saving_ms: 300,
            saved_visible_ms: 2000,
        }
    }
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// The live document
    pub document_path: PathBuf,

    /// The saved template library
    pub templates_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            document_path: base.join("document.json"),
            templates_path: base.join("templates.json"),
        }
    }
}

/// Export scaffold settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// `<title>` of the exported document
    pub title: String,

    /// Width bound of the centered content table, in pixels
    pub max_width: u32,

    /// Page background around the content table
    pub background_color: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Email template".to_string(),
            max_width: 600,
            background_color: "#f3f4f6".to_string(),
        }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Custom key bindings: key combo (`"Ctrl+Shift+Z"`) to shortcut name
    /// (`"redo"`)
    pub bindings: HashMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor.history_limit, 50);
        assert_eq!(config.editor.autosave_delay(), Duration::from_millis(1000));
        assert!(config.editor.seed_starter_document);
        assert_eq!(config.status.saving_ms, 300);
        assert_eq!(config.export.max_width, 600);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.editor.history_limit, config.editor.history_limit);
        assert_eq!(parsed.export, config.export);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [export]
            title = "Weekly digest"

            [keyboard.bindings]
            "Ctrl+R" = "redo"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.export.title, "Weekly digest");
        assert_eq!(parsed.export.max_width, 600);
        assert_eq!(parsed.editor.autosave_delay_ms, 1000);
        assert_eq!(parsed.keyboard.bindings["Ctrl+R"], "redo");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.editor.history_limit = 10;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.editor.history_limit, 10);
    }
}
