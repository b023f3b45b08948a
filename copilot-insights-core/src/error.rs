//! Error types for copilot-insights-core

use thiserror::Error;

/// Main error type for the copilot-insights-core library
///
/// The aggregation functions never return this: missing sub-trees, empty
/// inputs and zero denominators are all handled by defaulting. Errors only
/// come from the query layer, configuration and argument parsing.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Query layer (HTTP or file source) error
    #[error("source error: {0}")]
    Source(String),

    /// Start date after end date
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// `custom` time range without explicit dates
    #[error("custom time range requires a start and end date")]
    MissingCustomRange,

    /// Unrecognised value for an enum-like argument
    #[error("invalid {what}: {value}")]
    Parse { what: &'static str, value: String },
}

/// Result type alias for copilot-insights-core
pub type Result<T> = std::result::Result<T, Error>;
