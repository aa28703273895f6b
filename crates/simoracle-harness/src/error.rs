use std::path::PathBuf;

use simoracle_core::OracleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid harness config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to start simulator {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("simulator timed out after {0} seconds")]
    Timeout(u64),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
