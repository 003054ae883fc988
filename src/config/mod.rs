//! Configuration management for the time window resolver
//!
//! This module handles loading, validating, and providing access to the
//! resolver configuration. It supports loading configuration from TOML files,
//! environment variables, and programmatic overrides.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod types;
pub mod validation;

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod validation_tests;

#[cfg(test)]
#[path = "tests/config_mod_tests.rs"]
mod config_mod_tests;

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};
use directories::ProjectDirs;

use serde::{Deserialize, Serialize};

/// Re-export the error type
pub use error::ConfigError;
pub use types::LogLevel;

/// The environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "TWR_";

/// The application name used for finding config directories
const APP_NAME: &str = "timewindow-resolver";

/// Main configuration structure for the resolver.
///
/// # Example
///
/// ```no_run
/// use timewindow_resolver::config::Config;
///
/// // A missing file falls back to defaults (plus `TWR_` environment overrides).
/// let config = Config::load("path/to/resolver.toml").unwrap();
/// assert!(config.limits.max_datapoints > 0);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Datapoint limits used when choosing aggregation intervals
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Timezone defaults
    #[serde(default)]
    pub timezone: TimezoneConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Datapoint limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Hard cap on datapoints returned by a single query
    pub max_datapoints: u32,
    /// Number of buckets a default aggregation interval aims for
    pub target_datapoints: u32,
    /// Finest default aggregation interval in milliseconds
    pub min_interval_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_datapoints: 50_000,
            target_datapoints: 200,
            min_interval_ms: 1_000,
        }
    }
}

/// Timezone defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimezoneConfig {
    /// IANA zone reported as the default instead of the guessed local zone
    pub default: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

impl Config {
    /// Loads the configuration from the specified path.
    ///
    /// A missing file yields the defaults. In both cases `TWR_` environment
    /// variables are applied on top and the result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, if an
    /// environment override is malformed, or if validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path) {
            Ok(config_str) => toml::from_str::<Config>(&config_str)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("Config file not found at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                return Err(ConfigError::file_not_found(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Environment variables are prefixed with `TWR_` and use `_` as a separator,
    /// e.g. `TWR_LOGGING_LEVEL=debug` or `TWR_LIMITS_MAX_DATAPOINTS=1000`.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable cannot be parsed.
    pub fn apply_env_vars(&mut self) -> Result<(), ConfigError> {
        for (key, value) in env::vars() {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match stripped.to_lowercase().as_str() {
                "logging_level" => {
                    self.logging.level = value.parse().map_err(|_| {
                        ConfigError::invalid_value("logging.level", value, "Invalid log level")
                    })?;
                }
                "limits_max_datapoints" => {
                    self.limits.max_datapoints = value.parse().map_err(|_| {
                        ConfigError::invalid_value("limits.max_datapoints", value, "Expected an unsigned integer")
                    })?;
                }
                "limits_target_datapoints" => {
                    self.limits.target_datapoints = value.parse().map_err(|_| {
                        ConfigError::invalid_value("limits.target_datapoints", value, "Expected an unsigned integer")
                    })?;
                }
                "limits_min_interval_ms" => {
                    self.limits.min_interval_ms = value.parse().map_err(|_| {
                        ConfigError::invalid_value("limits.min_interval_ms", value, "Expected an unsigned integer")
                    })?;
                }
                "timezone_default" => {
                    self.timezone.default = Some(value.to_string());
                }
                other => log::debug!("Ignoring unknown override {}{}", ENV_PREFIX, other.to_uppercase()),
            }
        }

        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Returns the path to the directory where configuration files should be stored.
    ///
    /// This is OS-specific:
    /// - Linux: `$HOME/.config/timewindow-resolver`
    /// - macOS: `$HOME/Library/Application Support/com.timewindow.timewindow-resolver`
    /// - Windows: `%APPDATA%\\timewindow\\timewindow-resolver`
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "timewindow", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }
}
