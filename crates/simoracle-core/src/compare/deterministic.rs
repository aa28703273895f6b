//! Column-by-column diffing for runs that should share raw ids.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::diagnostic::{DeterministicReport, Diagnostic, Side};
use crate::error::Result;
use crate::reader::{Table, TableReader};

/// Compare two same-named tables, appending diagnostics to `out`.
///
/// The run-id column is ignored. A schema or length mismatch stops this
/// table's comparison; dtype and value mismatches are reported per column
/// and the scan continues.
pub fn compare_tables(a: &Table, b: &Table, run_id_column: &str, out: &mut Vec<Diagnostic>) {
    let table = a.name().to_string();
    let columns_a: Vec<String> = a
        .column_names()
        .into_iter()
        .filter(|c| *c != run_id_column)
        .map(String::from)
        .collect();
    let columns_b: Vec<String> = b
        .column_names()
        .into_iter()
        .filter(|c| *c != run_id_column)
        .map(String::from)
        .collect();

    if columns_a != columns_b {
        out.push(Diagnostic::SchemaMismatch {
            table,
            columns_a,
            columns_b,
        });
        return;
    }

    if a.len() != b.len() {
        out.push(Diagnostic::LengthMismatch {
            table,
            len_a: a.len(),
            len_b: b.len(),
        });
        return;
    }

    let total = a.len();
    for name in &columns_a {
        // both lookups succeed: the filtered name lists are equal
        let (Some(ia), Some(ib)) = (a.column_index(name), b.column_index(name)) else {
            continue;
        };
        let dtype_a = &a.columns()[ia].dtype;
        let dtype_b = &b.columns()[ib].dtype;
        if dtype_a != dtype_b {
            out.push(Diagnostic::DatatypeMismatch {
                table: table.clone(),
                column: name.clone(),
                dtype_a: dtype_a.clone(),
                dtype_b: dtype_b.clone(),
            });
            continue;
        }

        let mut rows = Vec::new();
        let mut values_a = Vec::new();
        let mut values_b = Vec::new();
        for (row, (va, vb)) in a.column_values(ia).zip(b.column_values(ib)).enumerate() {
            if va != vb {
                rows.push(row);
                values_a.push(va.clone());
                values_b.push(vb.clone());
            }
        }
        if !rows.is_empty() {
            let mismatch_percent = 100.0 * rows.len() as f64 / total as f64;
            out.push(Diagnostic::ValueMismatch {
                table: table.clone(),
                column: name.clone(),
                rows,
                values_a,
                values_b,
                mismatch_percent,
            });
        }
    }
}

/// Compare every table of two databases position by position.
pub fn compare_databases(
    a: &dyn TableReader,
    b: &dyn TableReader,
    run_id_column: &str,
    verbose: bool,
) -> Result<DeterministicReport> {
    let names_a: BTreeSet<String> = a.table_names()?.into_iter().collect();
    let names_b: BTreeSet<String> = b.table_names()?.into_iter().collect();

    let mut diagnostics = Vec::new();
    for name in names_a.difference(&names_b) {
        diagnostics.push(Diagnostic::StructuralMismatch {
            table: name.clone(),
            present_in: Side::A,
        });
    }
    for name in names_b.difference(&names_a) {
        diagnostics.push(Diagnostic::StructuralMismatch {
            table: name.clone(),
            present_in: Side::B,
        });
    }

    for name in names_a.intersection(&names_b) {
        let table_a = a.read_table(name)?;
        let table_b = b.read_table(name)?;
        let before = diagnostics.len();
        compare_tables(&table_a, &table_b, run_id_column, &mut diagnostics);
        debug!(
            table = %name,
            diagnostics = diagnostics.len() - before,
            "compared table"
        );
    }

    let report = DeterministicReport::new(diagnostics);
    if verbose {
        for d in &report.diagnostics {
            warn!("{d}");
        }
        if report.identical {
            info!(a = a.label(), b = b.label(), "the databases are the same");
        }
    }
    Ok(report)
}
