//! Per-table canonicalization.
//!
//! A [`TableRegistry`] maps table names to [`TableRule`] implementations.
//! Dispatch is by explicit registration only: a table with no rule
//! contributes nothing to a snapshot.

pub mod rules;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::invariant::{AgentInvariant, InvariantContext, ResourceInvariant};
use crate::reader::{FieldValue, Table};
use crate::schema;

pub use rules::{EntityRule, ScalarRule, TimeBucketRule};

/// One cell of a canonical row: a literal or an invariant standing in for
/// a run-local id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CanonicalField {
    Literal(FieldValue),
    Agent(Arc<AgentInvariant>),
    /// A parent reference that marks a root agent.
    NoAgent,
    Resource(Arc<ResourceInvariant>),
}

pub type CanonicalRow = Vec<CanonicalField>;

/// Identifier-free, order-independent value of one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CanonicalTableValue {
    /// `(invariant, attributes)` pairs sorted by invariant.
    Entities(Vec<(Arc<AgentInvariant>, CanonicalRow)>),
    /// Flat field tuple of a single-row metadata table.
    Scalars(Vec<FieldValue>),
    /// Rows grouped by time step. Only non-empty steps are stored; each
    /// bucket is kept sorted so that equality ignores row order within a step
    /// while the step keys pin both the range and the order across steps.
    TimeBuckets(BTreeMap<i64, Vec<CanonicalRow>>),
}

impl CanonicalTableValue {
    /// Number of canonical entries (entities, scalars, or bucketed rows).
    pub fn len(&self) -> usize {
        match self {
            CanonicalTableValue::Entities(v) => v.len(),
            CanonicalTableValue::Scalars(v) => v.len(),
            CanonicalTableValue::TimeBuckets(steps) => steps.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns one table's rows into its canonical value.
pub trait TableRule: Send + Sync + fmt::Debug {
    fn canonicalize(&self, table: &Table, ctx: &InvariantContext) -> Result<CanonicalTableValue>;
}

/// Explicit table name → rule mapping.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    rules: BTreeMap<String, Arc<dyn TableRule>>,
}

impl TableRegistry {
    /// A registry with no rules; every table is skipped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for the simulator's standard output tables.
    ///
    /// `Resources` is intentionally absent: resource identity only matters
    /// through references from other tables.
    pub fn cyclus() -> Self {
        Self::empty()
            .with(
                schema::AGENT_ENTRY,
                EntityRule::new("AgentId")
                    .with_parent("ParentId")
                    .dropping([schema::SIM_ID]),
            )
            .with(
                schema::AGENT_EXIT,
                EntityRule::new("AgentId").dropping([schema::SIM_ID]),
            )
            .with(
                schema::INFO,
                ScalarRule::new(["InitialYear", "InitialMonth", "Duration"]),
            )
            .with(
                schema::SIMULATION_TIME_INFO,
                ScalarRule::new([
                    "InitialYear",
                    "InitialMonth",
                    "SimulationStart",
                    "Duration",
                    "DecayInterval",
                ]),
            )
            .with(
                schema::TRANSACTIONS,
                TimeBucketRule::new("Time")
                    .agent_refs(["SenderId", "ReceiverId"])
                    .resource_refs(["ResourceId"])
                    .dropping([schema::SIM_ID, "TransactionId"]),
            )
            .with(
                schema::ENRICHMENTS,
                TimeBucketRule::new("Time")
                    .agent_refs(["AgentId"])
                    .resource_refs(["ResourceId"])
                    .dropping([schema::SIM_ID]),
            )
    }

    /// Register `rule` for `table`, replacing any previous rule.
    pub fn register(&mut self, table: impl Into<String>, rule: impl TableRule + 'static) {
        self.rules.insert(table.into(), Arc::new(rule));
    }

    /// Builder form of [`TableRegistry::register`].
    pub fn with(mut self, table: impl Into<String>, rule: impl TableRule + 'static) -> Self {
        self.register(table, rule);
        self
    }

    pub fn remove(&mut self, table: &str) -> bool {
        self.rules.remove(table).is_some()
    }

    pub fn is_registered(&self, table: &str) -> bool {
        self.rules.contains_key(table)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Canonicalize `table` with its registered rule; `None` when unregistered.
    pub fn canonicalize(
        &self,
        table: &Table,
        ctx: &InvariantContext,
    ) -> Result<Option<CanonicalTableValue>> {
        let Some(rule) = self.rules.get(table.name()) else {
            debug!(table = table.name(), "no rule registered, skipping");
            return Ok(None);
        };
        let value = rule.canonicalize(table, ctx)?;
        debug!(table = table.name(), entries = value.len(), "canonicalized table");
        Ok(Some(value))
    }
}
