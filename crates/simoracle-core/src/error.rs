//! Error taxonomy for the regression oracle.
//!
//! Only genuine structural corruption is an error. Differences between two
//! databases are reported as [`crate::Diagnostic`] values, never as `Err`.

use std::path::PathBuf;

/// Fatal failures of a snapshot or comparison call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("invalid database {source_name}: {reason}")]
    InvalidDatabase { source_name: String, reason: String },

    #[error("agent {agent_id} (row {row}) references parent {parent_id} that was not registered earlier")]
    MissingParent {
        agent_id: i64,
        parent_id: i64,
        row: usize,
    },

    #[error("table {table} column {column} references unknown id {id}")]
    DanglingReference {
        table: String,
        column: String,
        id: i64,
    },

    #[error("table {table} has no column {column}")]
    MissingColumn { table: String, column: String },

    #[error("checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OracleError {
    pub(crate) fn invalid(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        OracleError::InvalidDatabase {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
