//! Natural-language query pipeline: classify, extract a horizon,
//! generate SQL, normalize its output shape, and execute it.

pub mod classifier;
pub mod executor;
pub mod generator;
pub mod horizon;
pub mod normalizer;
pub mod types;

pub use classifier::QueryClassifier;
pub use executor::SqlExecutor;
pub use generator::{GeneratedSql, SqlGenerator};
pub use horizon::extract_horizon;
pub use normalizer::enforce_forecast_columns;
pub use types::{QueryType, ResultSet};
