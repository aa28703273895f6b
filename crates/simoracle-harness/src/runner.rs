//! Simulator invocation.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::SimulatorConfig;
use crate::error::{HarnessError, Result};

/// Result of one simulator invocation.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Exit code; -1 when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub success: bool,
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Runs the simulator once, writing its database to `output`.
#[async_trait]
pub trait SimulatorRunner: Send + Sync {
    async fn run(&self, input: &Path, output: &Path) -> Result<RunOutcome>;
}

/// Launches an external simulator binary as
/// `<binary> -o <output> --input-file <input> [extra args]`.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    config: SimulatorConfig,
}

impl CommandSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            output.display().to_string(),
            "--input-file".to_string(),
            input.display().to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl SimulatorRunner for CommandSimulator {
    async fn run(&self, input: &Path, output: &Path) -> Result<RunOutcome> {
        let start = Instant::now();
        let child = Command::new(&self.config.binary)
            .args(self.args(input, output))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                binary: self.config.binary.clone(),
                source,
            })?;

        let output = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| HarnessError::Timeout(self.config.timeout_secs))??
        } else {
            child.wait_with_output().await?
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, duration_ms, "simulator finished");

        Ok(RunOutcome {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms,
            success: output.status.success(),
        })
    }
}
