//! Forecasting strategy seam.

use async_trait::async_trait;

use crate::error::ForecastError;

use super::series::{ForecastPoint, HistoricalSeries};

/// A single forecasting capability: series + horizon in, points out.
///
/// The engine holds a ranked list of these and returns the first
/// success; a strategy failing for any reason simply hands off to the
/// next one.
#[async_trait]
pub trait ForecastStrategy: Send + Sync {
    /// Project `horizon` periods past the end of `series`.
    ///
    /// Must return exactly `horizon` points with strictly increasing
    /// period labels continuing the historical sequence.
    async fn forecast(
        &self,
        series: &HistoricalSeries,
        horizon: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError>;

    /// Name of this strategy, for logging.
    fn name(&self) -> &str;
}
