//! Simulation regression oracle CLI
//!
//! ## Commands
//!
//! - `compare`: tolerant (default) or deterministic comparison of two databases
//! - `snapshot`: list a database's tables and print its canonical digest
//! - `analyze`: repeated simulator runs measuring nondeterminism
//! - `verify-refs`: check reference databases against their recorded checksums

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use simoracle_core::{verify_checksum, Database, Oracle, ReferenceList};
use simoracle_harness::{
    render_text_report, run_analysis, write_json_report, write_text_report, AnalysisReport,
    CommandSimulator, HarnessConfig,
};

#[derive(Parser)]
#[command(name = "simoracle")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Regression oracle for simulation output databases", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two output databases; exits 1 when they differ
    Compare {
        a: PathBuf,
        b: PathBuf,

        /// Column-by-column comparison instead of the id-tolerant one
        #[arg(long)]
        deterministic: bool,
    },

    /// Print the tables and canonical digest of a database
    Snapshot { db: PathBuf },

    /// Run the simulator repeatedly and report nondeterminism frequencies
    Analyze {
        /// Harness config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of iterations
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// Worker count
        #[arg(short = 'j', long)]
        workers: Option<usize>,

        /// Reference database
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Simulator input file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Simulator executable
        #[arg(long)]
        simulator: Option<String>,

        /// Text report path (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also write a JSON report here
        #[arg(long)]
        json_out: Option<PathBuf>,
    },

    /// Verify reference databases listed in a reflist file
    VerifyRefs {
        reflist: PathBuf,

        /// Directory holding the reference files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    simoracle_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Compare {
            a,
            b,
            deterministic,
        } => {
            let same = cmd_compare(&a, &b, deterministic, cli.verbose)?;
            if !same {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Snapshot { db } => cmd_snapshot(&db),
        Commands::Analyze {
            config,
            iterations,
            workers,
            reference,
            input,
            simulator,
            out,
            json_out,
        } => {
            let mut harness = match config {
                Some(path) => HarnessConfig::load(&path)
                    .with_context(|| format!("load harness config {:?}", path))?,
                None => HarnessConfig::default(),
            };
            if let Some(n) = iterations {
                harness.iterations = n;
            }
            if workers.is_some() {
                harness.workers = workers;
            }
            if let Some(path) = reference {
                harness.reference_db = path;
            }
            if let Some(path) = input {
                harness.simulator.input_file = path;
            }
            if let Some(binary) = simulator {
                harness.simulator.binary = binary;
            }
            cmd_analyze(&harness, out.as_deref(), json_out.as_deref()).await
        }
        Commands::VerifyRefs { reflist, dir } => cmd_verify_refs(&reflist, &dir),
    }
}

fn cmd_compare(a: &Path, b: &Path, deterministic: bool, verbose: bool) -> Result<bool> {
    let db_a = Database::open(a).with_context(|| format!("open {:?}", a))?;
    let db_b = Database::open(b).with_context(|| format!("open {:?}", b))?;
    let oracle = Oracle::default();

    let same = if deterministic {
        let report = oracle.compare_deterministic(&db_a, &db_b, verbose)?;
        for diagnostic in &report.diagnostics {
            println!("{}", diagnostic);
        }
        report.identical
    } else {
        oracle.compare_nondeterministic(&db_a, &db_b)?
    };

    println!("{}", if same { "same" } else { "different" });
    Ok(same)
}

fn cmd_snapshot(path: &Path) -> Result<()> {
    let db = Database::open(path).with_context(|| format!("open {:?}", path))?;
    let snapshot = Oracle::default().snapshot(&db)?;

    for name in snapshot.table_names() {
        match snapshot.value(name) {
            Some(value) => println!("{} ({} canonical entries)", name, value.len()),
            None => println!("{} (no canonical rule)", name),
        }
    }
    println!("digest: {}", snapshot.digest()?);
    Ok(())
}

async fn cmd_analyze(
    config: &HarnessConfig,
    out: Option<&Path>,
    json_out: Option<&Path>,
) -> Result<()> {
    let runner = Arc::new(CommandSimulator::new(config.simulator.clone()));
    let outcome = run_analysis(config, runner)
        .await
        .context("nondeterminism analysis failed")?;

    match out {
        Some(path) => {
            write_text_report(path, &outcome.summary)?;
            info!(path = %path.display(), "wrote report");
        }
        None => print!("{}", render_text_report(&outcome.summary)),
    }

    if let Some(path) = json_out {
        let report = AnalysisReport::new(outcome.summary, outcome.workers, outcome.duration_ms);
        write_json_report(path, &report)?;
        info!(path = %path.display(), "wrote JSON report");
    }
    Ok(())
}

fn cmd_verify_refs(reflist: &Path, dir: &Path) -> Result<()> {
    let list = ReferenceList::load(reflist).with_context(|| format!("load {:?}", reflist))?;
    let latest = list.latest();
    if latest.is_empty() {
        println!("No reference databases listed.");
        return Ok(());
    }

    for entry in latest {
        let path = dir.join(&entry.file_name);
        verify_checksum(&path, &entry.checksum)?;
        println!(
            "ok {} (input {}, {} / {})",
            entry.file_name, entry.input_file, entry.cyclus_ref, entry.cycamore_ref
        );
    }
    Ok(())
}
