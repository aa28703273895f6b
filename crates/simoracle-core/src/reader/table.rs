use serde::{Deserialize, Serialize};

use super::value::{DataType, FieldValue};
use crate::error::{OracleError, Result};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub dtype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// A materialized table: ordered rows aligned with a fixed column list.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<FieldValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, coercing each cell into its column dtype.
    pub fn push_row(&mut self, values: Vec<FieldValue>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(OracleError::invalid(
                &self.name,
                format!(
                    "row {} has {} cells, expected {}",
                    self.rows.len(),
                    values.len(),
                    self.columns.len()
                ),
            ));
        }
        let row = self.rows.len();
        let coerced = values
            .into_iter()
            .zip(&self.columns)
            .map(|(value, column)| {
                let shown = value.to_string();
                column.dtype.coerce(value).ok_or_else(|| {
                    OracleError::invalid(
                        &self.name,
                        format!(
                            "row {row} column {}: value {shown} is not {}",
                            column.name, column.dtype
                        ),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.rows.push(coerced);
        Ok(())
    }

    /// Builder form of [`Table::push_row`].
    pub fn with_row(mut self, values: Vec<FieldValue>) -> Result<Self> {
        self.push_row(values)?;
        Ok(self)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Like [`Table::column_index`], but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| OracleError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[FieldValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row(&self, index: usize) -> Option<&[FieldValue]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cells of one column, top to bottom.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &FieldValue> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Integer cell at (`row`, `col`); any other dtype is an invalid database.
    pub fn int_at(&self, row: usize, col: usize) -> Result<i64> {
        let cell = self.rows.get(row).and_then(|r| r.get(col));
        cell.and_then(FieldValue::as_int).ok_or_else(|| {
            let column = self
                .columns
                .get(col)
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            OracleError::invalid(
                &self.name,
                format!("row {row} column {column} is not an integer id"),
            )
        })
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Column>, Vec<Vec<FieldValue>>) {
        (self.name, self.columns, self.rows)
    }
}
