//! Time-series forecasting over `(date, value)` query results.
//!
//! The engine executes a historical query, validates its shape, then
//! walks a ranked list of [`ForecastStrategy`] backends and returns the
//! first success: the hosted forecasting API, then a classical
//! ARIMA(2,1,2) model.

pub mod arima;
pub mod engine;
pub mod hosted;
pub mod series;
pub mod strategy;

pub use arima::ArimaStrategy;
pub use engine::{ForecastEngine, ForecastOutcome};
pub use hosted::HostedForecaster;
pub use series::{ForecastPoint, HistoricalSeries, PeriodGranularity};
pub use strategy::ForecastStrategy;
