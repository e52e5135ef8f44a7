//! Forecast column normalizer.
//!
//! Best-effort textual rewrite that coerces generated SQL into the
//! `(date, value)` contract the forecasting stage expects. This is not
//! a SQL parser: only the `AS <alias>` form is recognized, and only a
//! fixed set of alias spellings. SQL that slips past the patterns is
//! discarded wholesale in favor of the default monthly series — callers
//! get a possibly-wrong but always shape-conforming statement.

use std::sync::LazyLock;

use regex::Regex;

use super::generator::DEFAULT_MONTHLY_ORDERS_SQL;

static AS_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bas\s+(month|year|period)\b").unwrap());
static AS_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bas\s+(amount|sales|revenue|total|qty|quantity)\b").unwrap()
});

/// Rewrite column aliases so the result set conforms to `(date, value)`.
///
/// Applied only to forecast-typed SQL. If after rewriting the statement
/// has neither a `date` alias nor any `GROUP BY`, it is replaced with
/// the fixed default monthly order-count query.
pub fn enforce_forecast_columns(sql: &str) -> String {
    let sql = AS_DATE_RE.replace_all(sql, "AS date").into_owned();
    let sql = AS_VALUE_RE.replace_all(&sql, "AS value").into_owned();

    let lower = sql.to_lowercase();
    if !lower.contains(" as date") && !lower.contains("group by") {
        return DEFAULT_MONTHLY_ORDERS_SQL.to_string();
    }
    sql
}
