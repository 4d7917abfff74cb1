//! Configuration management for the timer registry
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments. Variables may also come from a `.env` file, see
//! [`load_dotenv`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub use crate::service::config::{ConfigError, ServerConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Timer store configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue {
                field: "storage.backend".to_string(),
                reason: format!("Unknown backend: {other}"),
            }),
        }
    }
}

/// Timer store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which backend to open
    pub backend: StorageBackend,

    /// SQLite database path
    pub sqlite_path: PathBuf,

    /// Deadline for a single storage call in seconds (unbounded when unset)
    pub timeout_secs: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: PathBuf::from("data/timers.db"),
            timeout_secs: None,
        }
    }
}

impl StorageConfig {
    /// Get storage deadline as Duration
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("TIMERSTORE_HOST").unwrap_or(defaults.server.host);

        let port = std::env::var("TIMERSTORE_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.server.port);

        let backend = match std::env::var("TIMERSTORE_STORAGE") {
            Ok(v) => v.parse::<StorageBackend>()?,
            Err(_) => defaults.storage.backend,
        };

        let sqlite_path = std::env::var("TIMERSTORE_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage.sqlite_path);

        let timeout_secs = std::env::var("TIMERSTORE_STORAGE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());

        let certfile = std::env::var("TIMERSTORE_CERTFILE").ok().map(PathBuf::from);
        let keyfile = std::env::var("TIMERSTORE_KEYFILE").ok().map(PathBuf::from);

        let level = std::env::var("TIMERSTORE_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("TIMERSTORE_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                certfile,
                keyfile,
                ..defaults.server
            },
            storage: StorageConfig {
                backend,
                sqlite_path,
                timeout_secs,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply a command-line log format and validate the result
    pub fn with_log_format(mut self, format: Option<String>) -> Result<Self> {
        if let Some(format) = format {
            self.logging.format = format;
        }
        self.validate()?;
        Ok(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;

        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.sqlite_path.as_os_str().is_empty()
        {
            anyhow::bail!("sqlite_path must be set for the sqlite backend");
        }

        if self.storage.timeout_secs == Some(0) {
            anyhow::bail!("storage timeout must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Load variables from a `.env` file into the process environment
///
/// Variables that are already set keep their value. Without an explicit
/// `path`, a missing `.env` in the working directory (or its parents) is
/// not an error. Returns the file that was loaded.
pub fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(file) => Ok(Some(file)),
        Err(e) if path.is_none() && e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}
