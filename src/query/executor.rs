//! Read-only SQL execution.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::error::{ConfigError, Result, SqlError};

use super::types::ResultSet;

/// Executes validated read-only statements against the SQLite database.
///
/// Opens a fresh connection per call, materializes all rows, and drops
/// the connection. No pooling, no retries.
pub struct SqlExecutor {
    db_path: PathBuf,
}

impl SqlExecutor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a statement and return its full result set.
    ///
    /// Statements not lexically starting with `select` or `with` are
    /// rejected before any driver contact. This is a prefix check only,
    /// not a statement-safety guarantee.
    pub fn execute(&self, sql: &str) -> Result<ResultSet> {
        if !is_read_only(sql) {
            return Err(SqlError::NotReadOnly.into());
        }
        if !self.db_path.exists() {
            return Err(ConfigError::DatabaseMissing(self.db_path.clone()).into());
        }

        let conn = Connection::open(&self.db_path).map_err(SqlError::Execution)?;
        let mut stmt = conn.prepare(sql.trim()).map_err(SqlError::Execution)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let column_count = columns.len();

        let mut rows_out = Vec::new();
        let mut rows = stmt.query([]).map_err(SqlError::Execution)?;
        while let Some(row) = rows.next().map_err(SqlError::Execution)? {
            let mut out = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value = row.get_ref(i).map_err(SqlError::Execution)?;
                out.push(value_to_json(value));
            }
            rows_out.push(out);
        }

        Ok(ResultSet {
            columns,
            rows: rows_out,
        })
    }
}

/// Lexical read-only guard: leading whitespace trimmed, case-insensitive
/// SELECT or WITH prefix.
pub fn is_read_only(sql: &str) -> bool {
    let lower = sql.trim_start().to_lowercase();
    lower.starts_with("select") || lower.starts_with("with")
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        // Blobs have no JSON shape the frontend consumes; render as hex.
        ValueRef::Blob(b) => {
            serde_json::Value::String(b.iter().map(|byte| format!("{:02x}", byte)).collect())
        }
    }
}
