//! SQL generation.
//!
//! Asks the chat model for a SQL statement answering the question given
//! the live schema text. When no client is configured, or the call
//! fails, selection falls back to a small library of canned Northwind
//! queries keyed on substrings of the question.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;

use crate::llm::ChatClient;

use super::types::QueryType;

/// Fixed default: monthly order counts. Query-type-agnostic baseline —
/// it is already shaped as a `(date, value)` series, so it doubles as a
/// safe forecast source.
pub const DEFAULT_MONTHLY_ORDERS_SQL: &str = "SELECT strftime('%Y-%m', OrderDate) AS date, \
COUNT(*) AS value FROM Orders GROUP BY strftime('%Y-%m', OrderDate) ORDER BY date;";

/// Generated SQL with provenance.
#[derive(Debug, Clone)]
pub struct GeneratedSql {
    pub sql: String,
    pub used_llm: bool,
    pub debug: serde_json::Value,
}

/// Generates SQL for a question, via LLM or canned fallback.
pub struct SqlGenerator {
    llm: Option<Arc<ChatClient>>,
}

impl SqlGenerator {
    pub fn new(llm: Option<Arc<ChatClient>>) -> Self {
        Self { llm }
    }

    /// Produce SQL for `question` against the given schema text.
    ///
    /// Never fails: any LLM error is recorded in the debug payload and
    /// routed to the canned fallback.
    pub async fn generate(
        &self,
        question: &str,
        schema_text: &str,
        query_type: QueryType,
    ) -> GeneratedSql {
        let system = build_system_prompt(query_type);
        let user = format!(
            "Schema:\n{}\n\nUser question: {}\nReturn ONLY SQL.",
            schema_text, question
        );

        if let Some(llm) = &self.llm {
            match llm.chat(&system, &user, 0.1, None).await {
                Ok(raw) => {
                    let sql = clean_sql(&raw);
                    if !sql.is_empty() {
                        return GeneratedSql {
                            sql,
                            used_llm: true,
                            debug: json!({"note": "llm used"}),
                        };
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "LLM SQL generation failed, using canned query");
                    return GeneratedSql {
                        sql: canned_sql(question).to_string(),
                        used_llm: false,
                        debug: json!({"llm_error": e.to_string()}),
                    };
                }
            }
        }

        GeneratedSql {
            sql: canned_sql(question).to_string(),
            used_llm: false,
            debug: json!({}),
        }
    }
}

/// System instruction for SQL generation. Forecast-typed questions get
/// additional guidance enforcing the `(date, value)` output contract.
fn build_system_prompt(query_type: QueryType) -> String {
    let mut prompt = String::from(
        "You are a SQLite SQL assistant for the Northwind database.\n\
         Use EXACT table names from the provided schema. If a table name has spaces \
         (e.g., Order Details), wrap it in double quotes.\n\
         Return ONLY the SQL query with no explanation.\n",
    );
    if query_type.is_forecast() {
        prompt.push_str(
            "\n\
             IMPORTANT FOR FORECASTING QUERIES:\n\
             - Return the HISTORICAL time-series needed for forecasting.\n\
             - The SQL must return exactly two columns: 'date' (period label) and 'value' (numeric).\n\
             - Use real period labels, not synthetic dates.\n\
               * Yearly:   strftime('%Y', OrderDate)        AS date\n\
               * Monthly:  strftime('%Y-%m', OrderDate)      AS date\n\
               * Quarterly: build as 'YYYY-Qn' via CASE on strftime('%m', OrderDate) and alias AS date\n\
             - Value examples:\n\
               * Sales:  SUM(od.Quantity * od.UnitPrice * (1 - od.Discount)) AS value\n\
               * Orders: COUNT(*) AS value\n\
             - Do NOT perform the forecast in SQL; only provide [date, value].\n\
             - Quote table names with spaces, e.g., \"Order Details\".\n",
        );
    }
    prompt
}

static FENCE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```sql\s*(.*?)```").unwrap());
static LEADING_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^```(?:sql)?\s*").unwrap());
static TRAILING_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\s*```$").unwrap());

/// Strip Markdown fences from a model response and, when it holds
/// multiple `;`-separated statements without a leading SELECT/WITH,
/// keep only the first statement.
pub fn clean_sql(text: &str) -> String {
    let mut sql = text.trim().to_string();
    sql = LEADING_FENCE_RE.replace(&sql, "").into_owned();
    sql = TRAILING_FENCE_RE.replace(&sql, "").into_owned();
    if let Some(caps) = FENCE_BLOCK_RE.captures(text) {
        sql = caps[1].trim().to_string();
    }

    let starts_read_only = {
        let lower = sql.trim_start().to_lowercase();
        lower.starts_with("select") || lower.starts_with("with")
    };
    if sql.contains(';') && sql.contains('\n') && !starts_read_only {
        if let Some(first) = sql.split(';').next() {
            sql = format!("{};", first);
        }
    }

    sql.trim().to_string()
}

/// Canned fallback query selected by substring match on the question.
pub fn canned_sql(question: &str) -> &'static str {
    let q = question.to_lowercase();
    if q.contains("top") && q.contains("customer") {
        return "SELECT c.CompanyName, COUNT(o.OrderID) AS TotalOrders \
                FROM Customers c JOIN Orders o ON c.CustomerID = o.CustomerID \
                GROUP BY c.CustomerID, c.CompanyName \
                ORDER BY TotalOrders DESC LIMIT 5;";
    }
    if q.contains("how many orders") || q.contains("total orders") {
        // Monthly grouping so the same query can feed the forecaster.
        return DEFAULT_MONTHLY_ORDERS_SQL;
    }
    if q.contains("top") && q.contains("employee") {
        return "SELECT e.FirstName || ' ' || e.LastName AS EmployeeName, \
                COUNT(o.OrderID) AS OrdersHandled \
                FROM Employees e JOIN Orders o ON e.EmployeeID = o.EmployeeID \
                GROUP BY e.EmployeeID ORDER BY OrdersHandled DESC LIMIT 3;";
    }
    if q.contains("by category") {
        return "SELECT c.CategoryName AS Category, \
                SUM(od.UnitPrice * od.Quantity * (1 - od.Discount)) AS SalesAmount \
                FROM Orders o \
                JOIN \"Order Details\" od ON od.OrderID = o.OrderID \
                JOIN Products p ON p.ProductID = od.ProductID \
                JOIN Categories c ON c.CategoryID = p.CategoryID \
                GROUP BY c.CategoryName ORDER BY SalesAmount DESC;";
    }
    DEFAULT_MONTHLY_ORDERS_SQL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_sql_strips_fenced_block() {
        let raw = "```sql\nSELECT * FROM Orders;\n```";
        assert_eq!(clean_sql(raw), "SELECT * FROM Orders;");
    }

    #[test]
    fn test_clean_sql_strips_bare_fences() {
        let raw = "```\nSELECT 1\n```";
        assert_eq!(clean_sql(raw), "SELECT 1");
    }

    #[test]
    fn test_clean_sql_passthrough() {
        assert_eq!(clean_sql("SELECT 1;"), "SELECT 1;");
    }

    #[test]
    fn test_clean_sql_keeps_first_statement_when_preamble_present() {
        let raw = "Here is your query\nPRAGMA foo;\nSELECT 1;\n";
        let cleaned = clean_sql(raw);
        assert!(cleaned.ends_with(';'));
        assert_eq!(cleaned.matches(';').count(), 1);
    }

    #[test]
    fn test_clean_sql_leaves_multi_statement_select_alone() {
        // Leading SELECT: the multi-statement trim does not apply.
        let raw = "SELECT 1;\nSELECT 2;";
        assert_eq!(clean_sql(raw), "SELECT 1;\nSELECT 2;");
    }

    #[test]
    fn test_canned_top_customers() {
        let sql = canned_sql("show me the top customers");
        assert!(sql.contains("CompanyName"));
        assert!(sql.contains("LIMIT 5"));
    }

    #[test]
    fn test_canned_total_orders_is_monthly_series() {
        assert_eq!(canned_sql("total orders please"), DEFAULT_MONTHLY_ORDERS_SQL);
        assert_eq!(
            canned_sql("how many orders did we get"),
            DEFAULT_MONTHLY_ORDERS_SQL
        );
    }

    #[test]
    fn test_canned_top_employees() {
        assert!(canned_sql("top employees by orders").contains("EmployeeName"));
    }

    #[test]
    fn test_canned_sales_by_category() {
        let sql = canned_sql("sales by category");
        assert!(sql.contains("CategoryName"));
        assert!(sql.contains("\"Order Details\""));
    }

    #[test]
    fn test_canned_default_is_monthly_orders() {
        assert_eq!(canned_sql("anything else entirely"), DEFAULT_MONTHLY_ORDERS_SQL);
    }

    #[test]
    fn test_forecast_prompt_carries_shape_contract() {
        let plain = build_system_prompt(QueryType::Plain);
        let forecast = build_system_prompt(QueryType::Forecast);
        assert!(!plain.contains("FORECASTING"));
        assert!(forecast.contains("'date' (period label) and 'value' (numeric)"));
        assert!(forecast.contains("Do NOT perform the forecast in SQL"));
    }

    #[tokio::test]
    async fn test_generate_without_llm_uses_canned() {
        let generator = SqlGenerator::new(None);
        let result = generator
            .generate("total orders", "Orders: OrderID", QueryType::Plain)
            .await;
        assert!(!result.used_llm);
        assert_eq!(result.sql, DEFAULT_MONTHLY_ORDERS_SQL);
        assert_eq!(result.debug, serde_json::json!({}));
    }
}
