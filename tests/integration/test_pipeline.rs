//! End-to-end pipeline tests: question in, table or forecast out.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::routing::post;
use axum::Router;
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;

use augury::api::handlers::{
    run_sql_handler, translate_handler, RunSqlRequest, TranslateRequest,
};
use augury::{ApiState, Config, QueryType};

/// Create a Northwind-shaped database with a jittered monthly order
/// series. Perfectly linear counts would give the classical model a
/// singular fit, so the volumes wobble deterministically.
fn create_northwind(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("northwind.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Customers (CustomerID TEXT PRIMARY KEY, CompanyName TEXT);
         CREATE TABLE Orders (OrderID INTEGER PRIMARY KEY, CustomerID TEXT, OrderDate TEXT);
         INSERT INTO Customers VALUES ('ALFKI', 'Alfreds Futterkiste'), ('ANATR', 'Ana Trujillo');",
    )
    .unwrap();

    let mut state: u64 = 11;
    for m in 0..14usize {
        let year = 2023 + m / 12;
        let month = (m % 12) + 1;
        let date = format!("{}-{:02}-10", year, month);
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let count = 3 * (m + 1) + ((state >> 33) % 5) as usize;
        for _ in 0..count {
            conn.execute(
                "INSERT INTO Orders (CustomerID, OrderDate) VALUES ('ALFKI', ?1)",
                [&date],
            )
            .unwrap();
        }
    }
    path
}

fn test_config(db_path: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.database.path = db_path.to_string_lossy().to_string();
    config
}

/// Spawn a local stub chat-completions endpoint. Classification prompts
/// get "forecast"; everything else gets a fenced SQL statement.
async fn spawn_stub_llm() -> String {
    async fn completions(Json(body): Json<Value>) -> Json<Value> {
        let system = body["messages"][0]["content"].as_str().unwrap_or_default();
        let content = if system.contains("query classifier") {
            "forecast".to_string()
        } else {
            "```sql\nSELECT strftime('%Y-%m', OrderDate) AS month, COUNT(*) AS total \
             FROM Orders GROUP BY strftime('%Y-%m', OrderDate) ORDER BY month;\n```"
                .to_string()
        };
        Json(json!({"choices": [{"message": {"content": content}}]}))
    }

    let app = Router::new().route("/", post(completions));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_forecast_question_end_to_end() {
    let dir = TempDir::new().unwrap();
    let db_path = create_northwind(&dir);

    let mut config = test_config(&db_path);
    config.llm.api_key = Some("test-key".to_string());
    config.llm.base_url = spawn_stub_llm().await;

    let state = Arc::new(ApiState::new(config).unwrap());

    // Ambiguous phrasing: neither keyword set matches, the stub LLM
    // breaks the tie toward forecast.
    let Json(translated) = translate_handler(
        State(state.clone()),
        Json(TranslateRequest {
            query: "What will total orders look like next 3 months?".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(translated.query_type, QueryType::Forecast);
    assert_eq!(translated.periods, Some(3));
    assert!(translated.used_llm);
    // Normalized from AS month / AS total to the (date, value) contract.
    assert!(translated.sql.contains("AS date"));
    assert!(translated.sql.contains("AS value"));

    // No hosted forecast key configured: the engine falls through to
    // the classical model.
    let Json(response) = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: translated.query_type.as_str().to_string(),
            sql: translated.sql,
            periods: translated.periods.map(|p| p as i64),
            used_llm: translated.used_llm,
        }),
    )
    .await
    .unwrap();

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["columns"], json!(["date", "value"]));

    let historical = body["forecast_result"]["historical"].as_array().unwrap();
    let forecast = body["forecast_result"]["forecast"].as_array().unwrap();
    assert_eq!(historical.len(), 14);
    assert_eq!(forecast.len(), 3);

    // Forecast labels strictly increase and continue the last
    // historical period (2024-02).
    let labels: Vec<&str> = forecast
        .iter()
        .map(|p| p["date"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["2024-03", "2024-04", "2024-05"]);
    for point in forecast {
        assert!(point["value"].is_number());
    }
}

#[tokio::test]
async fn test_plain_question_without_llm_uses_canned_sql() {
    let dir = TempDir::new().unwrap();
    let db_path = create_northwind(&dir);
    let state = Arc::new(ApiState::new(test_config(&db_path)).unwrap());

    let Json(translated) = translate_handler(
        State(state.clone()),
        Json(TranslateRequest {
            query: "How many orders did we receive?".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(translated.query_type, QueryType::Plain);
    assert_eq!(translated.periods, None);
    assert!(!translated.used_llm);

    let Json(response) = run_sql_handler(
        State(state),
        Json(RunSqlRequest {
            query_type: "plain".to_string(),
            sql: translated.sql,
            periods: None,
            used_llm: false,
        }),
    )
    .await
    .unwrap();

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["columns"], json!(["date", "value"]));
    assert_eq!(body["rows"].as_array().unwrap().len(), 14);
}

#[tokio::test]
async fn test_keyword_forecast_without_llm() {
    let dir = TempDir::new().unwrap();
    let db_path = create_northwind(&dir);
    let state = Arc::new(ApiState::new(test_config(&db_path)).unwrap());

    // "forecast" keyword classifies without any LLM; canned SQL is
    // already shaped as a monthly series.
    let Json(translated) = translate_handler(
        State(state),
        Json(TranslateRequest {
            query: "Forecast total orders for the next 2 quarters".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(translated.query_type, QueryType::Forecast);
    assert_eq!(translated.periods, Some(6));
    assert!(!translated.used_llm);
    assert!(translated.sql.contains("AS date"));
}

#[tokio::test]
async fn test_failed_llm_falls_back_to_canned_sql() {
    let dir = TempDir::new().unwrap();
    let db_path = create_northwind(&dir);

    // Key configured but the endpoint does not exist: generation must
    // fall back to a canned query and record the error in debug.
    let mut config = test_config(&db_path);
    config.llm.api_key = Some("test-key".to_string());
    config.llm.base_url = "http://127.0.0.1:1/unreachable".to_string();
    config.llm.timeout_secs = 2;

    let state = Arc::new(ApiState::new(config).unwrap());
    let Json(translated) = translate_handler(
        State(state),
        Json(TranslateRequest {
            query: "show me sales by category".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(translated.query_type, QueryType::Plain);
    assert!(!translated.used_llm);
    assert!(translated.sql.contains("CategoryName"));
    assert!(translated.debug.get("llm_error").is_some());
}
