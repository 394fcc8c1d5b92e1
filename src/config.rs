//! # Configuration Management Module
//!
//! Persistent watch settings stored in platform-appropriate locations.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `language`: Display language for the fuzzy time label (`"en"` or `"hr"`)
//! - `random_seed`: Fixed seed for curve synthesis, for reproducible demos
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/sweetie/config.toml
//! - Linux: ~/.config/sweetie/config.toml
//! - Windows: %APPDATA%\sweetie\config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::ConfigError;
use crate::fuzzy_time::Language;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,
}

impl Config {
    /// Get the path to the config file
    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sweetie")
            .join("config.toml")
    }

    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Load config from `path`, writing the default there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(ConfigError::ParseFailed),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string)
            .map_err(ConfigError::WriteFailed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.random_seed, None);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            language: Language::Hr,
            random_seed: Some(42),
        };

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("language = \"hr\""));
        assert!(toml_str.contains("random_seed = 42"));

        let unseeded = toml::to_string(&Config::default()).expect("Failed to serialize");
        assert!(!unseeded.contains("random_seed"));
    }

    #[test]
    fn test_config_deserialization() {
        let config: Config = toml::from_str("language = \"hr\"").expect("Failed to deserialize");
        assert_eq!(config.language, Language::Hr);
        assert_eq!(config.random_seed, None);

        let empty: Config = toml::from_str("").expect("Failed to deserialize");
        assert_eq!(empty, Config::default());
    }

    #[test]
    fn test_load_creates_default() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("sweetie").join("config.toml");

        let config = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");

        let config = Config {
            language: Language::Hr,
            random_seed: Some(7),
        };
        config.save_to(&path).expect("Failed to save config");

        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "language = 3").expect("Failed to write");

        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
