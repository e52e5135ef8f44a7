//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::{AuguryError, ForecastError, SqlError};
use crate::forecast::{ForecastEngine, ForecastOutcome};
use crate::llm::ChatClient;
use crate::query::horizon::DEFAULT_HORIZON_MONTHS;
use crate::query::{
    enforce_forecast_columns, extract_horizon, QueryClassifier, QueryType, SqlExecutor,
    SqlGenerator,
};
use crate::schema;

/// Application state shared across handlers, built once at startup.
pub struct ApiState {
    config: Config,
    classifier: QueryClassifier,
    generator: SqlGenerator,
    executor: SqlExecutor,
    engine: ForecastEngine,
}

impl ApiState {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        let llm = ChatClient::from_config(&config.llm)?.map(Arc::new);
        let engine = ForecastEngine::from_config(&config)?;
        let executor = SqlExecutor::new(config.database_path());
        Ok(Self {
            classifier: QueryClassifier::new(llm.clone()),
            generator: SqlGenerator::new(llm),
            executor,
            engine,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /api/translate`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    pub query: String,
}

/// Response of `POST /api/translate`.
#[derive(Debug, Clone, Serialize)]
pub struct TranslateResponse {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    pub sql: String,
    pub periods: Option<u32>,
    pub used_llm: bool,
    pub debug: serde_json::Value,
}

/// Body of `POST /api/run-sql`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSqlRequest {
    #[serde(rename = "type")]
    pub query_type: String,
    pub sql: String,
    #[serde(default)]
    pub periods: Option<i64>,
    #[serde(default)]
    pub used_llm: bool,
}

/// Response of `POST /api/run-sql`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RunSqlResponse {
    Plain {
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    },
    Forecast {
        columns: Vec<String>,
        forecast_result: ForecastOutcome,
    },
}

// ============================================================================
// Error mapping
// ============================================================================

/// Error wrapper mapping the crate error tree onto HTTP responses as
/// `{"detail": <message>}`, 400 for client errors and 500 otherwise.
#[derive(Debug)]
pub struct ApiError(AuguryError);

impl<E: Into<AuguryError>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AuguryError::Sql(SqlError::NotReadOnly) => StatusCode::BAD_REQUEST,
            AuguryError::Forecast(
                ForecastError::MissingColumns
                | ForecastError::UnparseableDate(_)
                | ForecastError::NonNumeric(_)
                | ForecastError::InsufficientData(_),
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(json!({"detail": self.0.to_string()}))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// `GET /api/ping`
pub async fn ping_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// `POST /api/translate`
pub async fn translate_handler(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let schema = schema::introspect(&state.config.database_path())?;
    let query_type = state.classifier.classify(&req.query).await;
    let periods = query_type
        .is_forecast()
        .then(|| extract_horizon(&req.query));

    let generated = state
        .generator
        .generate(&req.query, &schema.to_text(), query_type)
        .await;

    let sql = if query_type.is_forecast() {
        enforce_forecast_columns(&generated.sql)
    } else {
        generated.sql
    };

    Ok(Json(TranslateResponse {
        query_type,
        sql,
        periods,
        used_llm: generated.used_llm,
        debug: generated.debug,
    }))
}

/// `POST /api/run-sql`
pub async fn run_sql_handler(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<RunSqlRequest>,
) -> Result<Json<RunSqlResponse>, ApiError> {
    if req.query_type == "forecast" {
        // Horizon defaults to 6 when absent or non-positive.
        let periods = match req.periods {
            Some(p) if p > 0 => p as u32,
            _ => DEFAULT_HORIZON_MONTHS,
        };
        tracing::info!(sql = %req.sql, periods, "running forecast query");
        let outcome = state.engine.run(&req.sql, periods).await?;
        return Ok(Json(RunSqlResponse::Forecast {
            columns: vec!["date".to_string(), "value".to_string()],
            forecast_result: outcome,
        }));
    }

    let result = state.executor.execute(&req.sql)?;
    Ok(Json(RunSqlResponse::Plain {
        columns: result.columns,
        rows: result.rows,
    }))
}
