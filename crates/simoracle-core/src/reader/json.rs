//! JSON table database format.
//!
//! ```json
//! {"tables": [{"name": "AgentEntry",
//!              "columns": [{"name": "AgentId", "dtype": "int"}],
//!              "rows": [[1]]}]}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::table::{Column, Table};
use super::value::FieldValue;
use super::Database;
use crate::error::{OracleError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct RawDatabase {
    tables: Vec<RawTable>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawTable {
    name: String,
    columns: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<FieldValue>>,
}

impl Database {
    /// Read a JSON table database from disk.
    ///
    /// Unreadable files, malformed JSON and rows that do not fit their
    /// columns are all reported as [`OracleError::InvalidDatabase`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| OracleError::invalid(&label, format!("unreadable: {e}")))?;
        Self::from_json_str(label, &content)
    }

    /// Parse a JSON table database held in memory.
    pub fn from_json_str(label: impl Into<String>, content: &str) -> Result<Self> {
        let label = label.into();
        let raw: RawDatabase = serde_json::from_str(content)
            .map_err(|e| OracleError::invalid(&label, format!("malformed: {e}")))?;

        let mut db = Database::new(label);
        for raw_table in raw.tables {
            let mut table = Table::new(raw_table.name, raw_table.columns);
            for row in raw_table.rows {
                table.push_row(row)?;
            }
            if db.table(table.name()).is_some() {
                return Err(OracleError::invalid(
                    db.label.clone(),
                    format!("duplicate table {}", table.name()),
                ));
            }
            db.insert(table);
        }
        Ok(db)
    }

    /// Serialize to the JSON table format.
    pub fn to_json_string(&self) -> Result<String> {
        let raw = RawDatabase {
            tables: self
                .tables()
                .cloned()
                .map(|table| {
                    let (name, columns, rows) = table.into_parts();
                    RawTable {
                        name,
                        columns,
                        rows,
                    }
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Write to disk in the JSON table format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }
}
