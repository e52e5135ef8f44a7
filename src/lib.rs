//! Augury: natural-language to SQL translation with forecasting.
//!
//! Translates English business questions into SQLite SQL against the
//! Northwind database, executes the SQL, and — when the question implies
//! a future prediction — projects the resulting time series forward
//! using a hosted forecasting service with a classical ARIMA fallback.

pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod llm;
pub mod query;
pub mod schema;

pub use api::{create_router, ApiState};
pub use config::Config;
pub use error::{AuguryError, ConfigError, ForecastError, LlmError, Result, SqlError};
pub use forecast::{ForecastEngine, ForecastOutcome, ForecastPoint, ForecastStrategy};
pub use llm::ChatClient;
pub use query::{
    enforce_forecast_columns, extract_horizon, QueryClassifier, QueryType, ResultSet,
    SqlExecutor, SqlGenerator,
};
pub use schema::{introspect, SchemaDescription};
