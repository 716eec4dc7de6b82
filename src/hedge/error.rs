//! Error types for the hedge pipeline

use thiserror::Error;

/// Errors that can occur while validating inputs or running the pipeline.
///
/// Numeric gaps (short windows, zero volatility) are not errors: they surface as
/// `None` values in the output series.
#[derive(Error, Debug)]
pub enum HedgeError {
    /// Input series disagree in length or date index
    #[error("Alignment error: {0}")]
    Alignment(String),

    /// Not enough observations to do anything useful
    #[error("Insufficient data: expected at least {expected} data points, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// A price was non-positive or non-finite
    #[error("Invalid price in '{series}' at index {index}: {value}")]
    InvalidPrice {
        series: String,
        index: usize,
        value: f64,
    },

    /// Date index is not strictly increasing
    #[error("Date index of '{series}' is not strictly increasing at index {index}")]
    UnsortedIndex { series: String, index: usize },

    /// Date parsing error
    #[error("Date parsing error: {0}")]
    DateParse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// DataFrame construction or CSV parsing error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
