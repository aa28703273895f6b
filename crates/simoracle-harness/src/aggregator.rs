//! Nondeterminism frequency counting.
//!
//! - table frequency: runs where the table differed / total iterations
//! - column frequency: runs where the column differed / runs where its
//!   table differed
//!
//! Both are rounded to two decimals when normalized.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::observation::IterationOutcome;

/// Raw counts. Owned by a single aggregator task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    iterations: usize,
    skipped: usize,
    tables: BTreeMap<String, usize>,
    columns: BTreeMap<String, BTreeMap<String, usize>>,
}

impl FrequencyTable {
    pub fn record(&mut self, outcome: &IterationOutcome) {
        self.iterations += 1;
        match outcome {
            IterationOutcome::Skipped { .. } => self.skipped += 1,
            IterationOutcome::Observed { tables, columns } => {
                for table in tables {
                    *self.tables.entry(table.clone()).or_default() += 1;
                }
                for (table, column) in columns {
                    *self
                        .columns
                        .entry(table.clone())
                        .or_default()
                        .entry(column.clone())
                        .or_default() += 1;
                }
            }
        }
    }

    /// Iterations recorded, skipped ones included.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn table_count(&self, table: &str) -> usize {
        self.tables.get(table).copied().unwrap_or(0)
    }

    pub fn column_count(&self, table: &str, column: &str) -> usize {
        self.columns
            .get(table)
            .and_then(|cols| cols.get(column))
            .copied()
            .unwrap_or(0)
    }

    pub fn normalize(&self) -> NondeterminismSummary {
        let tables = self
            .tables
            .iter()
            .map(|(table, &count)| {
                let columns = self
                    .columns
                    .get(table)
                    .map(|cols| {
                        cols.iter()
                            .map(|(column, &n)| ColumnFrequency {
                                column: column.clone(),
                                frequency: ratio(n, count),
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                TableFrequency {
                    table: table.clone(),
                    frequency: ratio(count, self.iterations),
                    columns,
                }
            })
            .collect();

        NondeterminismSummary {
            iterations: self.iterations,
            skipped: self.skipped,
            tables,
        }
    }
}

fn ratio(n: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (n as f64 / total as f64 * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnFrequency {
    pub column: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableFrequency {
    pub table: String,
    pub frequency: f64,
    pub columns: Vec<ColumnFrequency>,
}

/// Normalized frequencies, tables sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NondeterminismSummary {
    pub iterations: usize,
    pub skipped: usize,
    pub tables: Vec<TableFrequency>,
}

impl NondeterminismSummary {
    pub fn is_clean(&self) -> bool {
        self.tables.is_empty()
    }
}
