//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{AssetsConfig, LogFormat, RelayConfig};
use crate::config::validation::{validate_assets_config, validate_config, ValidationError};

/// Environment variable carrying the upstream credential.
pub const ENV_API_KEY: &str = "key";
/// Environment variable overriding the static server port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the relay bind address.
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read and deserialize a TOML file without validating it.
pub fn parse_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the relay configuration: file (or defaults), then environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => RelayConfig::default(),
    };
    config.apply_env()?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the static asset server configuration.
pub fn load_assets_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => RelayConfig::default(),
    };
    config.apply_env()?;

    validate_assets_config(&config.assets).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl RelayConfig {
    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.upstream.api_key = key;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.assets.port = port.trim().parse::<u16>().map_err(|e| ConfigError::Env {
                var: ENV_PORT,
                message: format!("'{}' is not a valid port: {}", port, e),
            })?;
        }

        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.listener.bind_address = addr;
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.observability.log_level = level;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.observability.log_format = format
                .parse::<LogFormat>()
                .map_err(|message| ConfigError::Env { var: ENV_LOG_FORMAT, message })?;
        }

        Ok(())
    }

    /// Log the effective configuration. The credential is never printed.
    pub fn log_startup(&self) {
        tracing::info!(
            bind_address = %self.listener.bind_address,
            upstream = %self.upstream.url,
            rate_limit_enabled = self.rate_limit.enabled,
            max_requests = self.rate_limit.max_requests,
            window_ms = self.rate_limit.window_ms,
            upstream_timeout_secs = self.timeouts.upstream_secs,
            "Configuration loaded"
        );
    }
}

impl AssetsConfig {
    pub fn log_startup(&self) {
        tracing::info!(root = %self.root, bind_address = %self.bind_address(), "Configuration loaded");
    }
}
