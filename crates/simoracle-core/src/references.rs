//! Reference database list and checksum verification.
//!
//! A `reflist.json` enumerates reference outputs recorded for pairs of
//! simulator versions. Only the newest version pair is meant to be used.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{OracleError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "input-file")]
    pub input_file: String,
    #[serde(rename = "fname")]
    pub file_name: String,
    #[serde(rename = "sha-checksum")]
    pub checksum: String,
    #[serde(rename = "cyclus-ref")]
    pub cyclus_ref: String,
    #[serde(rename = "cycamore-ref")]
    pub cycamore_ref: String,
}

impl ReferenceEntry {
    fn same_versions(&self, other: &ReferenceEntry) -> bool {
        self.cyclus_ref == other.cyclus_ref && self.cycamore_ref == other.cycamore_ref
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceList {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceList {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Entries recorded with the same version pair as the last entry.
    pub fn latest(&self) -> Vec<&ReferenceEntry> {
        let Some(last) = self.entries.last() else {
            return Vec::new();
        };
        self.entries
            .iter()
            .filter(|e| e.same_versions(last))
            .collect()
    }
}

/// Hex SHA-256 of a file's contents.
pub fn file_sha256(path: impl AsRef<Path>) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Fail with [`OracleError::ChecksumMismatch`] unless the file hashes to
/// `expected` (case-insensitive hex).
pub fn verify_checksum(path: impl AsRef<Path>, expected: &str) -> Result<()> {
    let path = path.as_ref();
    let actual = file_sha256(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(OracleError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    debug!(path = %path.display(), "checksum verified");
    Ok(())
}
