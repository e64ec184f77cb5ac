//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Database settings
    pub database: DatabaseSettings,
    /// Chat settings
    pub chat: ChatSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database: DatabaseSettings::default(),
            chat: ChatSettings::default(),
        }
    }
}

impl AppConfig {
    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database.filename)
    }
}

/// Database-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file name inside the data directory
    pub filename: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            filename: "toque.db".to_string(),
        }
    }
}

/// Chat-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    /// How many recent messages to load per club
    pub history_limit: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self { history_limit: 50 }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("app", "toque", "Toque")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from file.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = get_config_path();

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
