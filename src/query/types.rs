//! Shared types for the query pipeline.

use serde::{Deserialize, Serialize};

/// How a natural-language question should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Direct lookup answerable by one SQL result.
    Plain,
    /// Needs a projection of a historical series into the future.
    Forecast,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Plain => "plain",
            QueryType::Forecast => "forecast",
        }
    }

    pub fn is_forecast(&self) -> bool {
        matches!(self, QueryType::Forecast)
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tabular query result: column names plus positionally aligned rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultSet {
    /// Index of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
