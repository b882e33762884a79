//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::diary::Calendar;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub diary: DiaryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local diary store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("photolog").to_string_lossy().to_string())
        .unwrap_or_else(|| "./photolog_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }
}

/// Diary browsing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiaryConfig {
    /// Owner whose diaries are shown
    #[serde(default = "default_owner_id")]
    pub owner_id: String,

    /// Calendar for month bucketing: "local", "utc" or an offset like "+09:00"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_owner_id() -> String {
    "default-user".to_string()
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner_id(),
            timezone: default_timezone(),
        }
    }
}

impl DiaryConfig {
    /// Parsed calendar; an unrecognised value falls back to local time
    pub fn calendar(&self) -> Calendar {
        Calendar::parse(&self.timezone).unwrap_or_else(|| {
            tracing::warn!(timezone = %self.timezone, "Unknown timezone, using local calendar");
            Calendar::Local
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("photolog").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("PHOTOLOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(owner) = lookup("PHOTOLOG_OWNER") {
            self.diary.owner_id = owner;
        }
        if let Some(timezone) = lookup("PHOTOLOG_TIMEZONE") {
            self.diary.timezone = timezone;
        }

        if let Some(level) = lookup("PHOTOLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PHOTOLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# PhotoLog Configuration
#
# Environment variables override these settings:
# - PHOTOLOG_DATA_DIR
# - PHOTOLOG_OWNER
# - PHOTOLOG_TIMEZONE
# - PHOTOLOG_LOG_LEVEL
# - PHOTOLOG_LOG_FORMAT

[storage]
# Directory holding the diary database
data_dir = "~/.local/share/photolog"

[diary]
# Owner whose diaries are listed
owner_id = "default-user"

# Calendar used to group diaries by month: "local", "utc" or an offset such as "+09:00"
timezone = "local"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
