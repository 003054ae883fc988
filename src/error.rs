//! Error types for the time window resolver
//!
//! This module defines the error types used throughout the crate.
//! The main error type is `TwError`, which covers timezone lookups, calendar
//! arithmetic that falls outside the representable range, invalid intervals
//! and windows, and the configuration layer.

use thiserror::Error;

use crate::time::quick::QuickTimeInterval;

/// Main error type for time window resolution
#[derive(Error, Debug)]
pub enum TwError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error (JSON): {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    /// The timezone id is not a known IANA zone
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Calendar arithmetic left the representable date range
    #[error("Timestamp out of range: {0}")]
    OutOfRange(String),

    /// An interval that cannot be used for bucketing
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A window whose end lies before its start
    #[error("Invalid window: start {start_ms} is after end {end_ms}")]
    InvalidWindow {
        /// Window start in epoch milliseconds.
        start_ms: i64,
        /// Window end in epoch milliseconds.
        end_ms: i64,
    },

    /// The quick interval has no entry in the rule table
    #[error("No boundary rule registered for quick interval {0}")]
    MissingRule(QuickTimeInterval),

    /// The window cannot be used as a comparison source
    #[error("Window is not comparable: {0}")]
    NotComparable(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for operations that can fail with a [TwError]
pub type Result<T> = std::result::Result<T, TwError>;

impl TwError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        TwError::InvalidInput(msg.into())
    }

    /// Create a new unknown timezone error
    pub fn unknown_timezone<S: Into<String>>(id: S) -> Self {
        TwError::UnknownTimezone(id.into())
    }

    /// Create a new out of range error
    pub fn out_of_range<S: Into<String>>(what: S) -> Self {
        TwError::OutOfRange(what.into())
    }

    /// Create a new invalid interval error
    pub fn invalid_interval<S: Into<String>>(what: S) -> Self {
        TwError::InvalidInterval(what.into())
    }

    /// Create a new not comparable error
    pub fn not_comparable<S: Into<String>>(what: S) -> Self {
        TwError::NotComparable(what.into())
    }
}

impl From<std::num::TryFromIntError> for TwError {
    fn from(err: std::num::TryFromIntError) -> Self {
        TwError::out_of_range(format!("Integer conversion error: {}", err))
    }
}
