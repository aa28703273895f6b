//! Parallel nondeterminism analysis.
//!
//! A fixed pool of workers pulls iteration indices from a shared cursor.
//! Each iteration runs the simulator into a fresh file, compares it with
//! the reference database and sends an [`IterationOutcome`] to a single
//! aggregator task. The driver joins every worker, closes the channel and
//! then collects the aggregator's table.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use simoracle_core::{compare_deterministic, Database};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregator::{FrequencyTable, NondeterminismSummary};
use crate::config::HarnessConfig;
use crate::error::Result;
use crate::observation::IterationOutcome;
use crate::runner::SimulatorRunner;

/// Everything an analysis produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub frequencies: FrequencyTable,
    pub summary: NondeterminismSummary,
    pub workers: usize,
    pub duration_ms: u64,
}

struct WorkerContext {
    runner: Arc<dyn SimulatorRunner>,
    reference: Arc<Database>,
    input: PathBuf,
    scratch: PathBuf,
    iterations: usize,
    cursor: AtomicUsize,
}

/// Run `config.iterations` simulations and measure how often each table
/// and column differs from the reference database.
pub async fn run_analysis(
    config: &HarnessConfig,
    runner: Arc<dyn SimulatorRunner>,
) -> Result<AnalysisOutcome> {
    let start = Instant::now();
    let reference = Arc::new(Database::open(&config.reference_db)?);

    // keeps a temporary scratch directory alive until the workers finish
    let (scratch, _scratch_guard) = match &config.scratch_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir).await?;
            (dir.clone(), None)
        }
        None => {
            let dir = tempfile::tempdir()?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };

    let workers = config.worker_count();
    info!(
        iterations = config.iterations,
        workers,
        reference = %config.reference_db.display(),
        "starting nondeterminism analysis"
    );

    let ctx = Arc::new(WorkerContext {
        runner,
        reference,
        input: config.simulator.input_file.clone(),
        scratch,
        iterations: config.iterations,
        cursor: AtomicUsize::new(0),
    });

    let (tx, rx) = mpsc::channel::<IterationOutcome>(workers * 2);
    let aggregator = tokio::spawn(aggregate(rx, config.iterations, config.progress_every));

    let handles: Vec<_> = (0..workers)
        .map(|worker| tokio::spawn(work(worker, Arc::clone(&ctx), tx.clone())))
        .collect();
    drop(tx);

    // join_all drains every worker before any failure is reported
    let failed = join_all(handles).await.into_iter().find_map(|joined| joined.err());
    if let Some(e) = failed {
        aggregator.abort();
        warn!(error = %e, "worker task failed, analysis aborted");
        return Err(e.into());
    }
    let frequencies = aggregator.await?;

    let summary = frequencies.normalize();
    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        iterations = frequencies.iterations(),
        skipped = frequencies.skipped(),
        nondeterministic_tables = summary.tables.len(),
        duration_ms,
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        frequencies,
        summary,
        workers,
        duration_ms,
    })
}

async fn aggregate(
    mut rx: mpsc::Receiver<IterationOutcome>,
    iterations: usize,
    progress_every: usize,
) -> FrequencyTable {
    let mut table = FrequencyTable::default();
    while let Some(outcome) = rx.recv().await {
        table.record(&outcome);
        let done = table.iterations();
        if progress_every > 0 && done % progress_every == 0 {
            info!(done, total = iterations, "progress");
        }
    }
    table
}

async fn work(worker: usize, ctx: Arc<WorkerContext>, tx: mpsc::Sender<IterationOutcome>) {
    loop {
        let index = ctx.cursor.fetch_add(1, Ordering::SeqCst);
        if index >= ctx.iterations {
            break;
        }
        let outcome = run_iteration(&ctx).await;
        if let IterationOutcome::Skipped { reason } = &outcome {
            warn!(worker, index, %reason, "iteration skipped");
        } else {
            debug!(worker, index, "iteration observed");
        }
        if tx.send(outcome).await.is_err() {
            break;
        }
    }
}

async fn run_iteration(ctx: &WorkerContext) -> IterationOutcome {
    let output = ctx.scratch.join(format!("{}.json", Uuid::new_v4()));

    let outcome = match ctx.runner.run(&ctx.input, &output).await {
        Err(e) => IterationOutcome::skipped(e.to_string()),
        Ok(run) if !run.passed() => {
            IterationOutcome::skipped(format!("simulator exited with code {}", run.exit_code))
        }
        Ok(_) => compare_output(Arc::clone(&ctx.reference), output.clone()).await,
    };

    remove_output(&output).await;
    outcome
}

async fn compare_output(reference: Arc<Database>, output: PathBuf) -> IterationOutcome {
    let compared = tokio::task::spawn_blocking(move || {
        let db = Database::open(&output)?;
        compare_deterministic(reference.as_ref(), &db, false)
    })
    .await;

    match compared {
        Ok(Ok(report)) => IterationOutcome::from_report(&report),
        Ok(Err(e)) => IterationOutcome::skipped(e.to_string()),
        Err(e) => IterationOutcome::skipped(format!("comparison task failed: {e}")),
    }
}

async fn remove_output(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "could not remove run output");
        }
    }
}
