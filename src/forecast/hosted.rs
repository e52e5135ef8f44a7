//! Hosted forecasting API backend.
//!
//! Primary forecasting path: ship the historical series to a hosted
//! time-series service and read back the projected mean. Any failure —
//! missing key, network, auth, malformed response — is reported to the
//! engine, which falls through to the classical model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ForecastApiConfig;
use crate::error::ForecastError;

use super::series::{ForecastPoint, HistoricalSeries};
use super::strategy::ForecastStrategy;

/// Client for the hosted forecasting service.
pub struct HostedForecaster {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct HostedForecastRequest {
    /// Period labels of the historical series.
    ds: Vec<String>,
    /// Historical values.
    y: Vec<f64>,
    /// Forecast horizon in periods.
    h: u32,
}

#[derive(Debug, Deserialize)]
struct HostedForecastResponse {
    /// Period labels of the forecast, when the service provides them.
    #[serde(default)]
    ds: Vec<String>,
    /// Projected mean values, one per horizon period.
    mean: Vec<f64>,
}

impl HostedForecaster {
    pub fn from_config(config: &ForecastApiConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForecastError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ForecastStrategy for HostedForecaster {
    async fn forecast(
        &self,
        series: &HistoricalSeries,
        horizon: u32,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        let api_key = self.api_key.as_ref().ok_or(ForecastError::MissingApiKey)?;

        let request = HostedForecastRequest {
            ds: series.labels(),
            y: series.values(),
            h: horizon,
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ForecastError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: HostedForecastResponse = response
            .json()
            .await
            .map_err(|e| ForecastError::Api(format!("Malformed response: {}", e)))?;

        if parsed.mean.len() < horizon as usize {
            return Err(ForecastError::Api(format!(
                "Service returned {} points for horizon {}",
                parsed.mean.len(),
                horizon
            )));
        }

        // Prefer the service's own labels; synthesize when absent.
        let labels = if parsed.ds.len() >= horizon as usize {
            parsed.ds
        } else {
            series.future_labels(horizon)
        };

        Ok(labels
            .into_iter()
            .zip(parsed.mean)
            .take(horizon as usize)
            .map(|(date, value)| ForecastPoint { date, value })
            .collect())
    }

    fn name(&self) -> &str {
        "hosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::ResultSet;
    use serde_json::json;

    fn small_series() -> HistoricalSeries {
        let rs = ResultSet {
            columns: vec!["date".to_string(), "value".to_string()],
            rows: vec![
                vec![json!("2024-01"), json!(1.0)],
                vec![json!("2024-02"), json!(2.0)],
                vec![json!("2024-03"), json!(3.0)],
            ],
        };
        HistoricalSeries::from_result_set(&rs).unwrap()
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let forecaster = HostedForecaster::from_config(&ForecastApiConfig::default()).unwrap();
        let err = forecaster.forecast(&small_series(), 3).await.unwrap_err();
        assert!(matches!(err, ForecastError::MissingApiKey));
    }
}
