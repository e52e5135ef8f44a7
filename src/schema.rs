//! Schema introspection.
//!
//! Reads table and column names from the SQLite database to build the
//! textual schema description used as LLM context. Rebuilt on every
//! request so it always reflects live schema state.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{ConfigError, Result, SqlError};

/// Ordered mapping from table name to its column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescription {
    tables: Vec<(String, Vec<String>)>,
}

impl SchemaDescription {
    /// Render the schema as one `Table: col1, col2, ...` line per table.
    pub fn to_text(&self) -> String {
        self.tables
            .iter()
            .map(|(table, cols)| format!("{}: {}", table, cols.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Table names in order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(t, _)| t.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Read the live schema from the database at `db_path`.
///
/// Opens a fresh connection, lists user tables ordered by name, reads
/// each table's columns via `PRAGMA table_info`, and closes.
pub fn introspect(db_path: &Path) -> Result<SchemaDescription> {
    if !db_path.exists() {
        return Err(ConfigError::DatabaseMissing(db_path.to_path_buf()).into());
    }
    let conn = Connection::open(db_path).map_err(SqlError::Execution)?;

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .map_err(SqlError::Execution)?;
    let table_names: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .map_err(SqlError::Execution)?
        .collect::<std::result::Result<_, _>>()
        .map_err(SqlError::Execution)?;
    drop(stmt);

    let mut tables = Vec::with_capacity(table_names.len());
    for table in table_names {
        let pragma = format!("PRAGMA table_info('{}')", table.replace('\'', "''"));
        let mut stmt = conn.prepare(&pragma).map_err(SqlError::Execution)?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .map_err(SqlError::Execution)?
            .collect::<std::result::Result<_, _>>()
            .map_err(SqlError::Execution)?;
        drop(stmt);
        tables.push((table, columns));
    }

    Ok(SchemaDescription { tables })
}
