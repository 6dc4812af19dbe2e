//! Configuration for the rollcall backend.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub calendar: CalendarConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("config.toml"),
            PathBuf::from("rollcall.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("rollcall/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".rollcall/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.storage.persistent && self.storage.data_dir.is_none() {
            return Err(ConfigError::MissingField("storage.data_dir".to_string()).into());
        }

        if self.calendar.default_region.trim().is_empty() {
            return Err(
                ConfigError::Invalid("calendar.default_region cannot be empty".to_string()).into(),
            );
        }

        if self.calendar.template_version.trim().is_empty() {
            return Err(
                ConfigError::Invalid("calendar.template_version cannot be empty".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether calendars are persisted to disk.
    pub persistent: bool,
    /// Directory holding the persistence file.
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            persistent: false,
            data_dir: None,
        }
    }
}

impl StorageConfig {
    /// The persistence directory, when persistence is enabled.
    pub fn data_dir(&self) -> Option<PathBuf> {
        if self.persistent {
            self.data_dir.clone()
        } else {
            None
        }
    }
}

/// Calendar generation defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Region stamped on generated calendars.
    pub default_region: String,
    /// Template version stamped on generated calendars.
    pub template_version: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            default_region: "default".to_string(),
            template_version: "1.0".to_string(),
        }
    }
}
