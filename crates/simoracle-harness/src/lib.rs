//! Nondeterminism statistics harness.
//!
//! Runs a simulator repeatedly, compares every output with a reference
//! database and reports how often each table and column differs.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod harness;
pub mod observation;
pub mod report;
pub mod runner;

pub use aggregator::{ColumnFrequency, FrequencyTable, NondeterminismSummary, TableFrequency};
pub use config::{HarnessConfig, SimulatorConfig};
pub use error::{HarnessError, Result};
pub use harness::{run_analysis, AnalysisOutcome};
pub use observation::IterationOutcome;
pub use report::{
    render_text_report, write_json_report, write_text_report, AnalysisReport,
};
pub use runner::{CommandSimulator, RunOutcome, SimulatorRunner};
