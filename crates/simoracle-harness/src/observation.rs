use std::collections::BTreeSet;

use simoracle_core::DeterministicReport;

/// What one iteration contributes to the statistics. Sent by workers to
/// the aggregator; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Tables and `(table, column)` pairs that differed from the reference.
    /// Both empty when the run matched.
    Observed {
        tables: BTreeSet<String>,
        columns: BTreeSet<(String, String)>,
    },
    /// The run produced nothing comparable.
    Skipped { reason: String },
}

impl IterationOutcome {
    pub fn from_report(report: &DeterministicReport) -> Self {
        IterationOutcome::Observed {
            tables: report
                .differing_tables()
                .into_iter()
                .map(String::from)
                .collect(),
            columns: report
                .differing_columns()
                .into_iter()
                .map(|(t, c)| (t.to_string(), c.to_string()))
                .collect(),
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        IterationOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, IterationOutcome::Skipped { .. })
    }
}
