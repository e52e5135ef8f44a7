//! Forecast engine: execute the historical query, validate the series,
//! and walk the ranked strategy list.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AuguryError, ForecastError, Result};
use crate::query::SqlExecutor;

use super::arima::ArimaStrategy;
use super::hosted::HostedForecaster;
use super::series::{ForecastPoint, HistoricalSeries};
use super::strategy::ForecastStrategy;

/// Historical points plus the projected continuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastOutcome {
    pub historical: Vec<ForecastPoint>,
    pub forecast: Vec<ForecastPoint>,
}

/// Runs forecast queries end to end.
pub struct ForecastEngine {
    executor: SqlExecutor,
    strategies: Vec<Box<dyn ForecastStrategy>>,
}

impl ForecastEngine {
    /// Build the engine with the default strategy ranking: hosted
    /// service first, classical ARIMA fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let hosted = HostedForecaster::from_config(&config.forecast)?;
        Ok(Self {
            executor: SqlExecutor::new(config.database_path()),
            strategies: vec![Box::new(hosted), Box::new(ArimaStrategy)],
        })
    }

    /// Build an engine with an explicit strategy ranking.
    pub fn with_strategies(
        executor: SqlExecutor,
        strategies: Vec<Box<dyn ForecastStrategy>>,
    ) -> Self {
        Self {
            executor,
            strategies,
        }
    }

    /// Execute `sql`, validate its `(date, value)` series, and project
    /// `periods` steps ahead using the first strategy that succeeds.
    pub async fn run(&self, sql: &str, periods: u32) -> Result<ForecastOutcome> {
        let result_set = self.executor.execute(sql)?;
        let series = HistoricalSeries::from_result_set(&result_set)?;
        if series.len() < 3 {
            return Err(ForecastError::InsufficientData(series.len()).into());
        }

        let mut last_error: AuguryError = ForecastError::MissingApiKey.into();
        for strategy in &self.strategies {
            match strategy.forecast(&series, periods).await {
                Ok(forecast) => {
                    tracing::info!(
                        strategy = strategy.name(),
                        periods,
                        points = series.len(),
                        "forecast complete"
                    );
                    return Ok(ForecastOutcome {
                        historical: series.to_points(),
                        forecast,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "forecast strategy failed, trying next"
                    );
                    last_error = e.into();
                }
            }
        }
        Err(last_error)
    }
}
