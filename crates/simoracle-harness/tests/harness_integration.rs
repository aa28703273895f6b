//! End-to-end runs of the analysis harness with scripted simulators.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use simoracle_core::{Column, DataType, Database, FieldValue, Table};
use simoracle_harness::{
    render_text_report, run_analysis, CommandSimulator, HarnessConfig, HarnessError, Result,
    RunOutcome, SimulatorConfig, SimulatorRunner,
};

fn resources(quantities: &[f64]) -> Database {
    let mut table = Table::new(
        "Resources",
        vec![
            Column::new("SimId", DataType::Text),
            Column::new("ResourceId", DataType::Int),
            Column::new("Quantity", DataType::Float),
        ],
    );
    for (i, &q) in quantities.iter().enumerate() {
        table
            .push_row(vec![
                FieldValue::from("run"),
                FieldValue::Int(i as i64),
                FieldValue::Float(q),
            ])
            .unwrap();
    }
    Database::new("run").with_table(table)
}

fn ok() -> RunOutcome {
    RunOutcome {
        exit_code: 0,
        stdout: String::new(),
        stderr: String::new(),
        duration_ms: 1,
        success: true,
    }
}

fn failed() -> RunOutcome {
    RunOutcome {
        exit_code: 1,
        success: false,
        ..ok()
    }
}

/// Every second run perturbs the last quantity; every `fail_every`-th call
/// exits with an error instead of writing anything.
struct ScriptedSimulator {
    calls: AtomicUsize,
    fail_every: Option<usize>,
}

impl ScriptedSimulator {
    fn new(fail_every: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_every,
        }
    }
}

#[async_trait]
impl SimulatorRunner for ScriptedSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<RunOutcome> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_every.map_or(false, |n| call % n == 0) {
            return Ok(failed());
        }
        let db = if call % 2 == 0 {
            resources(&[1.0, 2.5])
        } else {
            resources(&[1.0, 2.0])
        };
        db.save(output)?;
        Ok(ok())
    }
}

/// Exits cleanly but writes a file that is not a database.
struct GarbageSimulator;

#[async_trait]
impl SimulatorRunner for GarbageSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<RunOutcome> {
        tokio::fs::write(output, b"not a database").await?;
        Ok(ok())
    }
}

/// Panics on its second call, taking its worker task down with it.
struct PanickingSimulator {
    calls: AtomicUsize,
}

#[async_trait]
impl SimulatorRunner for PanickingSimulator {
    async fn run(&self, _input: &Path, output: &Path) -> Result<RunOutcome> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 1 {
            panic!("simulator crashed");
        }
        resources(&[1.0, 2.0]).save(output)?;
        Ok(ok())
    }
}

fn config(dir: &Path, iterations: usize, workers: usize) -> HarnessConfig {
    let reference = dir.join("reference.json");
    resources(&[1.0, 2.0]).save(&reference).unwrap();
    HarnessConfig {
        iterations,
        workers: Some(workers),
        reference_db: reference,
        scratch_dir: Some(dir.join("scratch")),
        progress_every: 2,
        ..HarnessConfig::default()
    }
}

fn scratch_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir.join("scratch"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

#[tokio::test]
async fn test_alternating_runs_give_half_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 8, 3);

    let outcome = run_analysis(&config, Arc::new(ScriptedSimulator::new(None)))
        .await
        .unwrap();

    assert_eq!(outcome.workers, 3);
    assert_eq!(outcome.frequencies.iterations(), 8);
    assert_eq!(outcome.frequencies.skipped(), 0);
    assert_eq!(outcome.summary.tables.len(), 1);

    let resources = &outcome.summary.tables[0];
    assert_eq!(resources.table, "Resources");
    assert_eq!(resources.frequency, 0.5);
    assert_eq!(resources.columns.len(), 1);
    assert_eq!(resources.columns[0].column, "Quantity");
    assert_eq!(resources.columns[0].frequency, 1.0);

    let text = render_text_report(&outcome.summary);
    assert!(text.contains("Resources 0.50\n  Quantity 1.00\n"));

    assert!(scratch_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_failed_runs_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 6, 2);

    // calls 3 and 6 fail, calls 2 and 4 differ
    let outcome = run_analysis(&config, Arc::new(ScriptedSimulator::new(Some(3))))
        .await
        .unwrap();

    assert_eq!(outcome.frequencies.iterations(), 6);
    assert_eq!(outcome.frequencies.skipped(), 2);
    assert_eq!(outcome.frequencies.table_count("Resources"), 2);
    assert_eq!(outcome.summary.tables[0].frequency, 0.33);
}

#[tokio::test]
async fn test_unreadable_output_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 3, 1);

    let outcome = run_analysis(&config, Arc::new(GarbageSimulator))
        .await
        .unwrap();

    assert_eq!(outcome.frequencies.skipped(), 3);
    assert!(outcome.summary.is_clean());
    assert!(render_text_report(&outcome.summary).ends_with("No nondeterminism found.\n"));
    assert!(scratch_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_missing_reference_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = HarnessConfig {
        iterations: 1,
        reference_db: dir.path().join("absent.json"),
        ..HarnessConfig::default()
    };

    let result = run_analysis(&config, Arc::new(GarbageSimulator)).await;
    assert!(matches!(result, Err(HarnessError::Oracle(_))));
}

#[tokio::test]
async fn test_worker_panic_fails_the_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4, 2);
    let sim = PanickingSimulator {
        calls: AtomicUsize::new(0),
    };

    let result = run_analysis(&config, Arc::new(sim)).await;
    match result {
        Err(HarnessError::Join(e)) => assert!(e.is_panic()),
        other => panic!("Expected Join error, got {:?}", other.map(|o| o.summary)),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_simulator_captures_output() {
    let sim = CommandSimulator::new(SimulatorConfig {
        binary: "echo".to_string(),
        ..SimulatorConfig::default()
    });
    let outcome = sim
        .run(Path::new("in.xml"), Path::new("out.json"))
        .await
        .unwrap();
    assert!(outcome.passed());
    assert_eq!(outcome.stdout.trim(), "-o out.json --input-file in.xml");
}

#[cfg(unix)]
#[tokio::test]
async fn test_command_simulator_reports_failure() {
    let sim = CommandSimulator::new(SimulatorConfig {
        binary: "false".to_string(),
        ..SimulatorConfig::default()
    });
    let outcome = sim
        .run(Path::new("in.xml"), Path::new("out.json"))
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.exit_code, 1);
}
