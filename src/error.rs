//! Error types for the Augury service.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Augury operations.
#[derive(Error, Debug)]
pub enum AuguryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("SQL error: {0}")]
    Sql(#[from] SqlError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Database not found at {0}")]
    DatabaseMissing(PathBuf),
}

/// Errors from the chat-completion client.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// SQL validation and execution errors.
#[derive(Error, Debug)]
pub enum SqlError {
    #[error("Only SELECT/CTE queries are allowed.")]
    NotReadOnly,

    #[error("SQL execution error: {0}")]
    Execution(#[from] rusqlite::Error),
}

/// Forecasting errors.
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Forecast queries must return columns [date, value].")]
    MissingColumns,

    #[error("Could not parse 'date' column value '{0}' into a date.")]
    UnparseableDate(String),

    #[error("Non-numeric 'value' column entry: {0}")]
    NonNumeric(String),

    #[error("Not enough data points for forecasting ({0} found, need at least 3).")]
    InsufficientData(usize),

    #[error("Forecast API key not configured")]
    MissingApiKey,

    #[error("Forecast API error: {0}")]
    Api(String),

    #[error("Model fit error: {0}")]
    Fit(String),
}

/// Result type alias for Augury operations.
pub type Result<T> = std::result::Result<T, AuguryError>;
