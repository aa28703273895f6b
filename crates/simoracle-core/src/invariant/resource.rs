use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::{OracleError, Result};
use crate::reader::{FieldValue, Table};
use crate::schema::ResourceTableSchema;

/// A resource record with its raw id stripped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceInvariant {
    attributes: Vec<FieldValue>,
}

impl ResourceInvariant {
    pub fn attributes(&self) -> &[FieldValue] {
        &self.attributes
    }
}

/// Raw resource id → invariant. Only used to substitute references.
#[derive(Debug, Clone, Default)]
pub struct ResourceInvariants {
    by_id: HashMap<i64, Arc<ResourceInvariant>>,
}

impl ResourceInvariants {
    pub fn get(&self, id: i64) -> Option<&Arc<ResourceInvariant>> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn resolve(&self, table: &str, column: &str, id: i64) -> Result<Arc<ResourceInvariant>> {
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

/// Build resource invariants. Row order does not matter.
pub fn build_resource_invariants(
    table: &Table,
    schema: &ResourceTableSchema,
) -> Result<ResourceInvariants> {
    let id_col = table.require_column(&schema.id_column)?;
    let attr_cols = schema
        .attribute_columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut by_id = HashMap::with_capacity(table.len());
    for (row_idx, row) in table.rows().enumerate() {
        let id = table.int_at(row_idx, id_col)?;
        let attributes = attr_cols.iter().map(|&c| row[c].clone()).collect();
        by_id.insert(id, Arc::new(ResourceInvariant { attributes }));
    }

    debug!(table = table.name(), resources = by_id.len(), "built resource invariants");
    Ok(ResourceInvariants { by_id })
}
