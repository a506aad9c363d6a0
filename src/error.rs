//! Error types for fx_forecast

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the forecasting pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Any failure while retrieving rates from the market-data provider
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Insufficient data: need at least {required} observations, found {available}")]
    InsufficientData { required: usize, available: usize },

    #[error(
        "Insufficient forecast: need {required} rows dated after {latest_date}, found {available}"
    )]
    InsufficientForecast {
        required: usize,
        available: usize,
        latest_date: NaiveDate,
    },

    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for fx_forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;
