//! Harness configuration.
//!
//! Every field has a default so a config file only needs to name what it
//! changes. Paths are taken as given (relative to the working directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// How to launch one simulator run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Simulator executable.
    pub binary: String,

    /// Input file passed with `--input-file`.
    pub input_file: PathBuf,

    /// Appended after the standard arguments.
    pub extra_args: Vec<String>,

    /// Per-run limit in seconds; 0 disables it.
    pub timeout_secs: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            binary: "cyclus".to_string(),
            input_file: PathBuf::from("./input/inventory.xml"),
            extra_args: Vec::new(),
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Total simulator runs.
    pub iterations: usize,

    /// Concurrent workers; `None` means one fewer than the CPU count.
    pub workers: Option<usize>,

    pub simulator: SimulatorConfig,

    /// Database every run is compared against.
    pub reference_db: PathBuf,

    /// Where run outputs are written; a temporary directory when unset.
    pub scratch_dir: Option<PathBuf>,

    /// Log progress every this many finished iterations; 0 disables it.
    pub progress_every: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            workers: None,
            simulator: SimulatorConfig::default(),
            reference_db: PathBuf::from("reference.json"),
            scratch_dir: None,
            progress_every: 10,
        }
    }
}

impl HarnessConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| HarnessError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Effective worker count, never zero and never more than the
    /// number of iterations.
    pub fn worker_count(&self) -> usize {
        let wanted = self.workers.unwrap_or_else(|| {
            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            if cpus == 1 {
                1
            } else {
                cpus - 1
            }
        });
        wanted.clamp(1, self.iterations.max(1))
    }
}
