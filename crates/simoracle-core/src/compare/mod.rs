//! Database comparison.
//!
//! - [`Oracle::compare_nondeterministic`]: tolerant; ids and intra-step
//!   ordering may differ, canonical content may not
//! - [`Oracle::compare_deterministic`]: column-by-column, with diagnostics

pub mod deterministic;
pub mod diagnostic;

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::reader::{Database, TableReader};
use crate::schema;
use crate::snapshot::{Snapshot, SnapshotAssembler};

pub use diagnostic::{DeterministicReport, Diagnostic, Side};

/// Bundles the snapshot assembler with the deterministic-mode settings.
#[derive(Debug, Clone)]
pub struct Oracle {
    assembler: SnapshotAssembler,
    run_id_column: String,
}

impl Default for Oracle {
    fn default() -> Self {
        Self::new(SnapshotAssembler::default())
    }
}

impl Oracle {
    pub fn new(assembler: SnapshotAssembler) -> Self {
        Self {
            assembler,
            run_id_column: schema::SIM_ID.to_string(),
        }
    }

    /// Column ignored by the deterministic comparison.
    pub fn with_run_id_column(mut self, column: impl Into<String>) -> Self {
        self.run_id_column = column.into();
        self
    }

    pub fn assembler(&self) -> &SnapshotAssembler {
        &self.assembler
    }

    pub fn snapshot(&self, reader: &dyn TableReader) -> Result<Snapshot> {
        self.assembler.assemble(reader)
    }

    /// Tolerant equivalence of two databases.
    ///
    /// Returns `Ok(false)` for any difference. Errors are reserved for
    /// unreadable or inconsistent input, such as an agent whose parent
    /// was never entered.
    pub fn compare_nondeterministic(
        &self,
        a: &dyn TableReader,
        b: &dyn TableReader,
    ) -> Result<bool> {
        let names_a: BTreeSet<String> = a.table_names()?.into_iter().collect();
        let names_b: BTreeSet<String> = b.table_names()?.into_iter().collect();
        if names_a != names_b {
            let only_a: Vec<_> = names_a.difference(&names_b).collect();
            let only_b: Vec<_> = names_b.difference(&names_a).collect();
            info!(?only_a, ?only_b, "table sets differ");
            return Ok(false);
        }

        let snapshot_a = self.snapshot(a)?;
        let snapshot_b = self.snapshot(b)?;
        Ok(compare_snapshots(&snapshot_a, &snapshot_b))
    }

    /// Strict comparison reporting every discrepancy.
    pub fn compare_deterministic(
        &self,
        a: &dyn TableReader,
        b: &dyn TableReader,
        verbose: bool,
    ) -> Result<DeterministicReport> {
        deterministic::compare_databases(a, b, &self.run_id_column, verbose)
    }
}

/// Snapshot equality, logging which tables differ.
pub fn compare_snapshots(a: &Snapshot, b: &Snapshot) -> bool {
    if a == b {
        return true;
    }
    info!(tables = ?a.differing_tables(b), "canonical snapshots differ");
    false
}

/// [`Oracle::compare_nondeterministic`] with the default table rules.
pub fn compare_nondeterministic(a: &dyn TableReader, b: &dyn TableReader) -> Result<bool> {
    Oracle::default().compare_nondeterministic(a, b)
}

/// [`Oracle::compare_deterministic`] with the default run-id column.
pub fn compare_deterministic(
    a: &dyn TableReader,
    b: &dyn TableReader,
    verbose: bool,
) -> Result<DeterministicReport> {
    Oracle::default().compare_deterministic(a, b, verbose)
}

/// Open two database files and compare them tolerantly.
pub fn compare_files_nondeterministic(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<bool> {
    let a = Database::open(a)?;
    let b = Database::open(b)?;
    compare_nondeterministic(&a, &b)
}

/// Open two database files and compare them strictly.
pub fn compare_files_deterministic(
    a: impl AsRef<Path>,
    b: impl AsRef<Path>,
    verbose: bool,
) -> Result<DeterministicReport> {
    let a = Database::open(a)?;
    let b = Database::open(b)?;
    compare_deterministic(&a, &b, verbose)
}
