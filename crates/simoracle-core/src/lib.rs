//! Simulation Output Oracle
//!
//! Decides whether two simulation output databases describe the same
//! simulation when the simulator assigns run-local ids and may reorder
//! records within a time step.

pub mod canonical;
pub mod compare;
pub mod error;
pub mod invariant;
pub mod reader;
pub mod references;
pub mod schema;
pub mod snapshot;
pub mod telemetry;

pub use canonical::{
    CanonicalField, CanonicalRow, CanonicalTableValue, EntityRule, ScalarRule, TableRegistry,
    TableRule, TimeBucketRule,
};
pub use compare::{
    compare_deterministic, compare_files_deterministic, compare_files_nondeterministic,
    compare_nondeterministic, compare_snapshots, DeterministicReport, Diagnostic, Oracle, Side,
};
pub use error::{OracleError, Result};
pub use invariant::{
    build_agent_invariants, build_resource_invariants, AgentInvariant, AgentInvariants,
    InvariantContext, ResourceInvariant, ResourceInvariants,
};
pub use reader::{Column, DataType, Database, FieldValue, Table, TableReader};
pub use references::{file_sha256, verify_checksum, ReferenceEntry, ReferenceList};
pub use schema::{AgentTableSchema, ResourceTableSchema};
pub use snapshot::{Snapshot, SnapshotAssembler};
pub use telemetry::init_tracing;

/// Oracle version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
