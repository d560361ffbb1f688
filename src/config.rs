use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use waterbuddy_core::reminder::DEFAULT_INTERVAL_MINUTES;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding users.json, logs.json, badges.json and the session
    pub data_dir: ConfigValue<PathBuf>,
    /// Minutes between reminders
    pub reminder_interval_minutes: ConfigValue<u32>,
    /// Also send reminders as desktop notifications
    pub desktop_notifications: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    reminder_interval_minutes: Option<u32>,
    desktop_notifications: Option<bool>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut reminder_interval_minutes =
            ConfigValue::new(DEFAULT_INTERVAL_MINUTES, ConfigSource::Default);
        let mut desktop_notifications = ConfigValue::new(false, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(minutes) = file_config.reminder_interval_minutes {
                reminder_interval_minutes = ConfigValue::new(minutes, ConfigSource::File);
            }
            if let Some(enabled) = file_config.desktop_notifications {
                desktop_notifications = ConfigValue::new(enabled, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("WATERBUDDY_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("WATERBUDDY_REMINDER_INTERVAL") {
            let minutes = raw
                .parse()
                .map_err(|_| ConfigError::InvalidEnv("WATERBUDDY_REMINDER_INTERVAL", raw))?;
            reminder_interval_minutes = ConfigValue::new(minutes, ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("WATERBUDDY_DESKTOP_NOTIFICATIONS") {
            let enabled = parse_bool(&raw)
                .ok_or(ConfigError::InvalidEnv("WATERBUDDY_DESKTOP_NOTIFICATIONS", raw))?;
            desktop_notifications = ConfigValue::new(enabled, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            reminder_interval_minutes,
            desktop_notifications,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/waterbuddy/
    /// - macOS: ~/Library/Application Support/waterbuddy/
    /// - Windows: %APPDATA%/waterbuddy/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waterbuddy")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/waterbuddy/
    /// - macOS: ~/Library/Application Support/waterbuddy/
    /// - Windows: %APPDATA%/waterbuddy/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waterbuddy")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value '{}' for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
