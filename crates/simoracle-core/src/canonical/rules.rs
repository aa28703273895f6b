//! Built-in table rules.
//!
//! - `EntityRule`: tables keyed by an agent id (agent entry/exit records)
//! - `ScalarRule`: single-row run metadata
//! - `TimeBucketRule`: event tables grouped per simulated time step

use std::collections::BTreeMap;

use super::{CanonicalField, CanonicalRow, CanonicalTableValue, TableRule};
use crate::error::{OracleError, Result};
use crate::invariant::InvariantContext;
use crate::reader::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Literal,
    Dropped,
    Agent,
    Parent,
    Resource,
}

/// What each column of a table turns into in a canonical row.
struct RowPlan {
    roles: Vec<Role>,
}

impl RowPlan {
    fn new(table: &Table) -> Self {
        Self {
            roles: vec![Role::Literal; table.columns().len()],
        }
    }

    /// Assign `role` to a column that must exist.
    fn require(&mut self, table: &Table, column: &str, role: Role) -> Result<usize> {
        let idx = table.require_column(column)?;
        self.roles[idx] = role;
        Ok(idx)
    }

    /// Drop a column if present; run-local columns may be absent.
    fn drop_if_present(&mut self, table: &Table, column: &str) {
        if let Some(idx) = table.column_index(column) {
            self.roles[idx] = Role::Dropped;
        }
    }

    /// Build the canonical row for `row_idx`. `owner` is the agent id the
    /// row describes, used to recognise self-referencing root parents.
    fn apply(
        &self,
        table: &Table,
        row_idx: usize,
        owner: Option<i64>,
        ctx: &InvariantContext,
    ) -> Result<CanonicalRow> {
        let row = table.row(row_idx).ok_or_else(|| {
            OracleError::invalid(table.name(), format!("row {row_idx} out of range"))
        })?;
        let mut out = Vec::with_capacity(row.len());
        for (col, role) in self.roles.iter().enumerate() {
            let column = &table.columns()[col].name;
            match role {
                Role::Dropped => {}
                Role::Literal => out.push(CanonicalField::Literal(row[col].clone())),
                Role::Agent => {
                    let id = table.int_at(row_idx, col)?;
                    out.push(CanonicalField::Agent(
                        ctx.agents.resolve(table.name(), column, id)?,
                    ));
                }
                Role::Parent => {
                    let id = table.int_at(row_idx, col)?;
                    let is_root = owner.map_or(false, |o| ctx.agents.is_root(o, id));
                    if is_root {
                        out.push(CanonicalField::NoAgent);
                    } else {
                        out.push(CanonicalField::Agent(
                            ctx.agents.resolve(table.name(), column, id)?,
                        ));
                    }
                }
                Role::Resource => {
                    let id = table.int_at(row_idx, col)?;
                    out.push(CanonicalField::Resource(
                        ctx.resources.resolve(table.name(), column, id)?,
                    ));
                }
            }
        }
        Ok(out)
    }
}

fn owned<const N: usize>(names: [&str; N]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Rows keyed by an agent id: each row becomes `(key invariant, attributes)`
/// and the pairs are sorted, so neither row order nor raw ids matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRule {
    pub key_column: String,
    pub parent_column: Option<String>,
    pub agent_refs: Vec<String>,
    pub dropped: Vec<String>,
}

impl EntityRule {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            parent_column: None,
            agent_refs: Vec::new(),
            dropped: Vec::new(),
        }
    }

    pub fn with_parent(mut self, column: impl Into<String>) -> Self {
        self.parent_column = Some(column.into());
        self
    }

    pub fn agent_refs<const N: usize>(mut self, columns: [&str; N]) -> Self {
        self.agent_refs.extend(owned(columns));
        self
    }

    pub fn dropping<const N: usize>(mut self, columns: [&str; N]) -> Self {
        self.dropped.extend(owned(columns));
        self
    }
}

impl TableRule for EntityRule {
    fn canonicalize(&self, table: &Table, ctx: &InvariantContext) -> Result<CanonicalTableValue> {
        let mut plan = RowPlan::new(table);
        let key_col = plan.require(table, &self.key_column, Role::Dropped)?;
        if let Some(parent) = &self.parent_column {
            plan.require(table, parent, Role::Parent)?;
        }
        for column in &self.agent_refs {
            plan.require(table, column, Role::Agent)?;
        }
        for column in &self.dropped {
            plan.drop_if_present(table, column);
        }

        let mut entities = Vec::with_capacity(table.len());
        for row_idx in 0..table.len() {
            let key_id = table.int_at(row_idx, key_col)?;
            let key = ctx.agents.resolve(table.name(), &self.key_column, key_id)?;
            let attributes = plan.apply(table, row_idx, Some(key_id), ctx)?;
            entities.push((key, attributes));
        }
        entities.sort();
        Ok(CanonicalTableValue::Entities(entities))
    }
}

/// Single-row metadata: the named fields, in the given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarRule {
    pub fields: Vec<String>,
}

impl ScalarRule {
    pub fn new<const N: usize>(fields: [&str; N]) -> Self {
        Self {
            fields: owned(fields),
        }
    }
}

impl TableRule for ScalarRule {
    fn canonicalize(&self, table: &Table, _ctx: &InvariantContext) -> Result<CanonicalTableValue> {
        let cols = self
            .fields
            .iter()
            .map(|f| table.require_column(f))
            .collect::<Result<Vec<_>>>()?;
        let values = table
            .rows()
            .flat_map(|row| cols.iter().map(move |&c| row[c].clone()))
            .collect();
        Ok(CanonicalTableValue::Scalars(values))
    }
}

/// Event rows partitioned by an integer time column.
///
/// Each time step that has rows gets a bucket keyed by the step; within a
/// bucket rows are compared as a multiset, across buckets order matters.
/// Agent and resource references are replaced by invariants; dropped
/// columns vanish; everything else is kept literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucketRule {
    pub time_column: String,
    pub agent_refs: Vec<String>,
    pub resource_refs: Vec<String>,
    pub dropped: Vec<String>,
}

impl TimeBucketRule {
    pub fn new(time_column: impl Into<String>) -> Self {
        Self {
            time_column: time_column.into(),
            agent_refs: Vec::new(),
            resource_refs: Vec::new(),
            dropped: Vec::new(),
        }
    }

    pub fn agent_refs<const N: usize>(mut self, columns: [&str; N]) -> Self {
        self.agent_refs.extend(owned(columns));
        self
    }

    pub fn resource_refs<const N: usize>(mut self, columns: [&str; N]) -> Self {
        self.resource_refs.extend(owned(columns));
        self
    }

    pub fn dropping<const N: usize>(mut self, columns: [&str; N]) -> Self {
        self.dropped.extend(owned(columns));
        self
    }
}

impl TableRule for TimeBucketRule {
    fn canonicalize(&self, table: &Table, ctx: &InvariantContext) -> Result<CanonicalTableValue> {
        let mut plan = RowPlan::new(table);
        let time_col = plan.require(table, &self.time_column, Role::Literal)?;
        for column in &self.agent_refs {
            plan.require(table, column, Role::Agent)?;
        }
        for column in &self.resource_refs {
            plan.require(table, column, Role::Resource)?;
        }
        for column in &self.dropped {
            plan.drop_if_present(table, column);
        }

        let mut steps: BTreeMap<i64, Vec<CanonicalRow>> = BTreeMap::new();
        for row_idx in 0..table.len() {
            let time = table.int_at(row_idx, time_col)?;
            let row = plan.apply(table, row_idx, None, ctx)?;
            steps.entry(time).or_default().push(row);
        }
        for bucket in steps.values_mut() {
            bucket.sort();
        }

        Ok(CanonicalTableValue::TimeBuckets(steps))
    }
}
