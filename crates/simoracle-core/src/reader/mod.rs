//! Abstract tabular-record interface consumed by the oracle.
//!
//! - `FieldValue` / `DataType`: typed cells and column dtypes
//! - `Table`: an ordered row sequence under a fixed column list
//! - `TableReader`: what a database must expose to be compared
//! - `Database`: in-memory reader, loadable from a JSON table file (`json`)

pub mod json;
pub mod table;
pub mod value;

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{OracleError, Result};

pub use table::{Column, Table};
pub use value::{DataType, FieldValue};

/// A source of named tables.
///
/// Implementations own their storage format; the oracle only enumerates
/// table names and materializes tables one at a time.
pub trait TableReader {
    /// Human-readable identifier used in errors and logs (usually a path).
    fn label(&self) -> &str;

    /// Names of all tables present.
    fn table_names(&self) -> Result<Vec<String>>;

    /// Materialize one table.
    fn read_table(&self, name: &str) -> Result<Cow<'_, Table>>;

    fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.table_names()?.iter().any(|n| n == name))
    }
}

/// An in-memory database keyed by table name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    label: String,
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Insert a table, replacing any previous table of the same name.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// Builder form of [`Database::insert`].
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

impl TableReader for Database {
    fn label(&self) -> &str {
        &self.label
    }

    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn read_table(&self, name: &str) -> Result<Cow<'_, Table>> {
        self.tables
            .get(name)
            .map(Cow::Borrowed)
            .ok_or_else(|| OracleError::invalid(&self.label, format!("no table named {name}")))
    }

    fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables.contains_key(name))
    }
}
