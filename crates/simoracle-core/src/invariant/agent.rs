use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{OracleError, Result};
use crate::reader::{FieldValue, Table};
use crate::schema::{AgentTableSchema, ROOT_PARENT_ID};

/// Identifier-free key of an agent.
///
/// Built from the agent's own non-id attributes and, recursively, its
/// parent's invariant. Two invariants are equal iff the agents' ancestor
/// chains are structurally identical; raw ids never participate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AgentInvariant {
    attributes: Vec<FieldValue>,
    parent: Option<Arc<AgentInvariant>>,
}

impl AgentInvariant {
    pub fn attributes(&self) -> &[FieldValue] {
        &self.attributes
    }

    pub fn parent(&self) -> Option<&AgentInvariant> {
        self.parent.as_deref()
    }

    /// Number of ancestors above this agent.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent();
        while let Some(p) = cursor {
            depth += 1;
            cursor = p.parent();
        }
        depth
    }
}

/// Raw agent id → invariant, for one database.
#[derive(Debug, Clone)]
pub struct AgentInvariants {
    by_id: HashMap<i64, Arc<AgentInvariant>>,
    root_parent_id: i64,
}

impl Default for AgentInvariants {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            root_parent_id: ROOT_PARENT_ID,
        }
    }
}

impl AgentInvariants {
    pub fn get(&self, id: i64) -> Option<&Arc<AgentInvariant>> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether `parent_id` marks `agent_id` as a root.
    ///
    /// Both the sentinel id and a self-reference count as "no parent".
    pub fn is_root(&self, agent_id: i64, parent_id: i64) -> bool {
        parent_id == self.root_parent_id || parent_id == agent_id
    }

    /// Look up an id referenced from another table.
    pub fn resolve(&self, table: &str, column: &str, id: i64) -> Result<Arc<AgentInvariant>> {
        self.by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| OracleError::DanglingReference {
                table: table.to_string(),
                column: column.to_string(),
                id,
            })
    }
}

/// Build agent invariants from the agent table.
///
/// Rows must be in creation order: a parent's row precedes every row that
/// names it as `parent_column`. A parent id that has not been seen yet is a
/// [`OracleError::MissingParent`]; an agent id that appears twice is an
/// [`OracleError::InvalidDatabase`].
pub fn build_agent_invariants(table: &Table, schema: &AgentTableSchema) -> Result<AgentInvariants> {
    let id_col = table.require_column(&schema.id_column)?;
    let parent_col = table.require_column(&schema.parent_column)?;
    let attr_cols = schema
        .attribute_columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut invariants = AgentInvariants {
        by_id: HashMap::with_capacity(table.len()),
        root_parent_id: schema.root_parent_id,
    };

    for (row_idx, row) in table.rows().enumerate() {
        let agent_id = table.int_at(row_idx, id_col)?;
        let parent_id = table.int_at(row_idx, parent_col)?;

        let parent = if invariants.is_root(agent_id, parent_id) {
            None
        } else {
            let found = invariants
                .by_id
                .get(&parent_id)
                .ok_or(OracleError::MissingParent {
                    agent_id,
                    parent_id,
                    row: row_idx,
                })?;
            Some(Arc::clone(found))
        };

        let attributes = attr_cols.iter().map(|&c| row[c].clone()).collect();
        if invariants.by_id.contains_key(&agent_id) {
            return Err(OracleError::invalid(
                table.name(),
                format!("row {row_idx}: duplicate agent id {agent_id}"),
            ));
        }
        invariants
            .by_id
            .insert(agent_id, Arc::new(AgentInvariant { attributes, parent }));
    }

    debug!(table = table.name(), agents = invariants.len(), "built agent invariants");
    Ok(invariants)
}
