//! Configuration management for Gamedex
//!
//! Handles the listing API endpoint, paging limits, search debounce, the
//! selectable filter options, and where persisted user data lives.
//! Configuration is a single TOML file; every field has a default.

mod api;
mod catalog;
mod storage;

pub use api::ApiConfig;
pub use catalog::{FilterConfig, PagingConfig, SearchConfig};
pub use storage::StorageConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Application directory name under the platform config/data dirs
pub const APP_DIR: &str = "gamedex";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main Gamedex configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamedexConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub paging: PagingConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub filters: FilterConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl GamedexConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = default_config_path()
            && path.exists()
        {
            return Self::load(&path);
        }

        tracing::warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging.page_size == 0 {
            return Err(ConfigError::Invalid("paging.page_size must be > 0".into()));
        }
        if self.api.fetch_limit == 0 {
            return Err(ConfigError::Invalid("api.fetch_limit must be > 0".into()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        Ok(())
    }
}

/// `<config_dir>/gamedex/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
