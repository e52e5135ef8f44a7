//! HTTP-surface tests: handler contracts and error status mapping.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

use augury::api::handlers::{ping_handler, run_sql_handler, RunSqlRequest};
use augury::{ApiState, Config};

fn fixture_state(months: usize) -> (TempDir, Arc<ApiState>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("northwind.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE Orders (OrderID INTEGER PRIMARY KEY, OrderDate TEXT);")
        .unwrap();
    let mut state: u64 = 3;
    for m in 0..months {
        let date = format!("2023-{:02}-05", (m % 12) + 1);
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        for _ in 0..(2 * (m + 1) + ((state >> 33) % 3) as usize) {
            conn.execute("INSERT INTO Orders (OrderDate) VALUES (?1)", [&date])
                .unwrap();
        }
    }

    let mut config = Config::default();
    config.database.path = path.to_string_lossy().to_string();
    (dir, Arc::new(ApiState::new(config).unwrap()))
}

#[tokio::test]
async fn test_ping_returns_ok_payload() {
    let Json(body) = ping_handler().await;
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_run_sql_rejects_ddl_with_400() {
    let (_dir, state) = fixture_state(3);
    let err = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "plain".to_string(),
            sql: "DROP TABLE Orders".to_string(),
            periods: None,
            used_llm: false,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejected_ddl_leaves_table_intact() {
    let (_dir, state) = fixture_state(3);
    let _ = run_sql_handler(
        State(state.clone()),
        Json(RunSqlRequest {
            query_type: "plain".to_string(),
            sql: "DROP TABLE Orders".to_string(),
            periods: None,
            used_llm: false,
        }),
    )
    .await;

    let Json(response) = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "plain".to_string(),
            sql: "SELECT COUNT(*) AS n FROM Orders".to_string(),
            periods: None,
            used_llm: false,
        }),
    )
    .await
    .unwrap();
    let body = serde_json::to_value(&response).unwrap();
    assert!(body["rows"][0][0].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_malformed_sql_maps_to_500() {
    let (_dir, state) = fixture_state(3);
    let err = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "plain".to_string(),
            sql: "SELECT x FROM NoSuchTable".to_string(),
            periods: None,
            used_llm: false,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.into_response().status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_forecast_with_too_few_points_maps_to_400() {
    let (_dir, state) = fixture_state(2);
    let err = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "forecast".to_string(),
            sql: "SELECT strftime('%Y-%m', OrderDate) AS date, COUNT(*) AS value \
                  FROM Orders GROUP BY strftime('%Y-%m', OrderDate) ORDER BY date"
                .to_string(),
            periods: Some(3),
            used_llm: false,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_positive_periods_defaults_to_six() {
    let (_dir, state) = fixture_state(14);
    let Json(response) = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "forecast".to_string(),
            sql: "SELECT strftime('%Y-%m', OrderDate) AS date, COUNT(*) AS value \
                  FROM Orders GROUP BY strftime('%Y-%m', OrderDate) ORDER BY date"
                .to_string(),
            periods: Some(0),
            used_llm: false,
        }),
    )
    .await
    .unwrap();
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["forecast_result"]["forecast"].as_array().unwrap().len(), 6);
}
