use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::reader::{DataType, FieldValue};

/// Which of the two compared databases something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

/// One discrepancy found by the deterministic comparison.
///
/// None of these abort the comparison; they are collected and reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The table exists in only one database.
    StructuralMismatch { table: String, present_in: Side },

    /// Column names or order differ (run-id column excluded).
    SchemaMismatch {
        table: String,
        columns_a: Vec<String>,
        columns_b: Vec<String>,
    },

    /// Row counts differ; the table's columns were not compared.
    LengthMismatch {
        table: String,
        len_a: usize,
        len_b: usize,
    },

    DatatypeMismatch {
        table: String,
        column: String,
        dtype_a: DataType,
        dtype_b: DataType,
    },

    ValueMismatch {
        table: String,
        column: String,
        rows: Vec<usize>,
        values_a: Vec<FieldValue>,
        values_b: Vec<FieldValue>,
        /// `100 * rows.len() / table length`.
        mismatch_percent: f64,
    },
}

impl Diagnostic {
    pub fn table(&self) -> &str {
        match self {
            Diagnostic::StructuralMismatch { table, .. }
            | Diagnostic::SchemaMismatch { table, .. }
            | Diagnostic::LengthMismatch { table, .. }
            | Diagnostic::DatatypeMismatch { table, .. }
            | Diagnostic::ValueMismatch { table, .. } => table,
        }
    }

    /// The column at fault, for column-level diagnostics.
    pub fn column(&self) -> Option<&str> {
        match self {
            Diagnostic::DatatypeMismatch { column, .. }
            | Diagnostic::ValueMismatch { column, .. } => Some(column),
            _ => None,
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} table is different: ", self.table())?;
        match self {
            Diagnostic::StructuralMismatch { present_in, .. } => {
                write!(f, "present only in {present_in}")
            }
            Diagnostic::SchemaMismatch {
                columns_a,
                columns_b,
                ..
            } => write!(
                f,
                "columns [{}] vs [{}]",
                columns_a.join(", "),
                columns_b.join(", ")
            ),
            Diagnostic::LengthMismatch { len_a, len_b, .. } => {
                write!(f, "{len_a} rows vs {len_b} rows")
            }
            Diagnostic::DatatypeMismatch {
                column,
                dtype_a,
                dtype_b,
                ..
            } => write!(f, "Column {column} dtype {dtype_a} vs {dtype_b}"),
            Diagnostic::ValueMismatch {
                column,
                rows,
                values_a,
                values_b,
                mismatch_percent,
                ..
            } => write!(
                f,
                "Column {column} mismatch {mismatch_percent:.2}% at rows [{}]: [{}] vs [{}]",
                join(rows),
                join(values_a),
                join(values_b)
            ),
        }
    }
}

/// Outcome of a deterministic comparison: a verdict plus every diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeterministicReport {
    pub identical: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl DeterministicReport {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            identical: diagnostics.is_empty(),
            diagnostics,
        }
    }

    /// Tables with at least one diagnostic.
    pub fn differing_tables(&self) -> BTreeSet<&str> {
        self.diagnostics.iter().map(Diagnostic::table).collect()
    }

    /// `(table, column)` pairs of every column-level diagnostic.
    pub fn differing_columns(&self) -> Vec<(&str, &str)> {
        self.diagnostics
            .iter()
            .filter_map(|d| d.column().map(|c| (d.table(), c)))
            .collect()
    }

    pub fn into_parts(self) -> (bool, Vec<Diagnostic>) {
        (self.identical, self.diagnostics)
    }
}
