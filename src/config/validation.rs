//! Configuration validation
//!
//! Checks that limits are usable together and that the configured default
//! timezone is a real IANA zone.

use super::{error::ConfigError, Config, LimitsConfig, TimezoneConfig};

/// Upper bound past which a datapoint cap is almost certainly a typo.
const SUSPICIOUS_MAX_DATAPOINTS: u32 = 10_000_000;

/// Validates the resolver configuration.
///
/// # Errors
///
/// Returns a `ConfigError` if any validation check fails.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    validate_limits(&config.limits)?;
    validate_timezone(&config.timezone)?;
    Ok(())
}

/// Validates the datapoint limits.
fn validate_limits(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.max_datapoints == 0 {
        return Err(ConfigError::invalid_value(
            "limits.max_datapoints",
            config.max_datapoints,
            "max_datapoints must be greater than 0",
        ));
    }

    if config.target_datapoints == 0 {
        return Err(ConfigError::invalid_value(
            "limits.target_datapoints",
            config.target_datapoints,
            "target_datapoints must be greater than 0",
        ));
    }

    if config.target_datapoints > config.max_datapoints {
        return Err(ConfigError::invalid_value(
            "limits.target_datapoints",
            config.target_datapoints,
            format!("target_datapoints cannot exceed max_datapoints ({})", config.max_datapoints),
        ));
    }

    if config.min_interval_ms == 0 {
        return Err(ConfigError::invalid_value(
            "limits.min_interval_ms",
            config.min_interval_ms,
            "min_interval_ms must be at least 1",
        ));
    }

    if config.max_datapoints > SUSPICIOUS_MAX_DATAPOINTS {
        log::warn!(
            "High value for max_datapoints ({}). Queries may return very large result sets.",
            config.max_datapoints
        );
    }

    Ok(())
}

/// Validates the timezone defaults.
fn validate_timezone(config: &TimezoneConfig) -> Result<(), ConfigError> {
    if let Some(id) = &config.default {
        if id.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::invalid_value("timezone.default", id, "Not a known IANA timezone"));
        }
    }
    Ok(())
}
