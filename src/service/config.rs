//! HTTP server configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Configuration for the timer API server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname or IP to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Enable CORS for API
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Expose Prometheus metrics at `/metrics`
    pub enable_metrics: bool,

    /// PEM certificate chain; HTTPS is served when set together with `keyfile`
    pub certfile: Option<PathBuf>,

    /// PEM private key matching `certfile`
    pub keyfile: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8443,
            enable_cors: true,
            enable_request_logging: true,
            enable_metrics: true,
            certfile: None,
            keyfile: None,
        }
    }
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Address string passed to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Certificate and key paths when HTTPS is configured
    pub fn tls_files(&self) -> Option<(&Path, &Path)> {
        match (&self.certfile, &self.keyfile) {
            (Some(cert), Some(key)) => Some((cert.as_path(), key.as_path())),
            _ => None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "host".to_string(),
            });
        }

        if self.host.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                reason: format!("Invalid hostname: {}", self.host),
            });
        }

        match (&self.certfile, &self.keyfile) {
            (Some(_), None) => {
                return Err(ConfigError::MissingField {
                    field: "keyfile".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingField {
                    field: "certfile".to_string(),
                })
            }
            _ => {}
        }

        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    enable_cors: Option<bool>,
    enable_request_logging: Option<bool>,
    enable_metrics: Option<bool>,
    tls: Option<(PathBuf, PathBuf)>,
}

impl ServerConfigBuilder {
    /// Set host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Enable/disable CORS
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.enable_cors = Some(enable);
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Enable/disable the metrics endpoint
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Serve HTTPS with the given PEM certificate and key
    pub fn tls(mut self, certfile: impl Into<PathBuf>, keyfile: impl Into<PathBuf>) -> Self {
        self.tls = Some((certfile.into(), keyfile.into()));
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let defaults = ServerConfig::default();
        let (certfile, keyfile) = self.tls.unzip();
        let config = ServerConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            enable_cors: self.enable_cors.unwrap_or(defaults.enable_cors),
            enable_request_logging: self
                .enable_request_logging
                .unwrap_or(defaults.enable_request_logging),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
            certfile,
            keyfile,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}
