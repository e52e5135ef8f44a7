//! API router and CORS configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers::{ping_handler, run_sql_handler, translate_handler, ApiState};

/// Create the API router.
///
/// Endpoints:
/// - POST /api/translate — classify a question and generate SQL
/// - POST /api/run-sql   — execute SQL, forecasting when asked
/// - GET  /api/ping      — health check
///
/// CORS is wide open, matching the development setup the frontend
/// expects.
pub fn create_router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/translate", post(translate_handler))
        .route("/api/run-sql", post(run_sql_handler))
        .route("/api/ping", get(ping_handler))
        .with_state(state)
        .layer(cors)
}
