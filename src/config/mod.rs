//! Configuration module.

mod settings;

pub use settings::{Config, DatabaseConfig, ForecastApiConfig, LlmConfig, ServerConfig};
