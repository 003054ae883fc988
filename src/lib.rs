// src/lib.rs

//! Time window and aggregation resolution for dashboard widgets.
//!
//! A widget [`Timewindow`] (realtime or history, last-N, quick calendar
//! range, fixed bounds) is resolved against an injected [`ClockProvider`]
//! into a [`ResolvedWindow`]: absolute or rolling bounds, an aggregation
//! interval and a bucket count that respects the datapoint limits.

pub mod config;
pub mod error;
pub mod time;
pub mod window;

pub use config::Config;
pub use error::{Result, TwError};
pub use time::{ClockProvider, Interval, IntervalUnit, QuickTimeInterval};
pub use window::{
    comparison_window, create_subscription_timewindow, ComparisonSpec, DefaultLimitPolicy, ResolvedWindow, Timewindow,
};

/// Loads configuration and installs the logger at the configured level.
///
/// Without a path the file `resolver.toml` in [`Config::config_dir`] is used;
/// a missing file yields the defaults.
///
/// # Errors
///
/// Fails if the configuration cannot be loaded or a logger is already installed.
#[cfg(feature = "logging")]
pub fn init(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => Config::config_dir()
            .map(|dir| dir.join("resolver.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("resolver.toml")),
    };
    let config = Config::load(&path)?;

    env_logger::Builder::from_default_env()
        .filter_level(config.logging.level.into())
        .try_init()
        .map_err(|e| TwError::invalid_input(format!("Failed to initialize logger: {}", e)))?;

    log::info!("Resolver initialized from {}", path.display());
    Ok(config)
}
