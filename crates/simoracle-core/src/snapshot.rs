//! Whole-database canonical snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::canonical::{CanonicalTableValue, TableRegistry};
use crate::error::Result;
use crate::invariant::{build_agent_invariants, build_resource_invariants, InvariantContext};
use crate::reader::TableReader;
use crate::schema::{AgentTableSchema, ResourceTableSchema};

/// Identifier-free representation of one database.
///
/// Two snapshots are equal iff they list the same table names and every
/// registered table has the same canonical value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    table_names: BTreeSet<String>,
    values: BTreeMap<String, CanonicalTableValue>,
}

impl Snapshot {
    /// Every table present in the database, registered or not.
    pub fn table_names(&self) -> &BTreeSet<String> {
        &self.table_names
    }

    pub fn value(&self, table: &str) -> Option<&CanonicalTableValue> {
        self.values.get(table)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &CanonicalTableValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Tables whose presence or canonical value differs between the two.
    pub fn differing_tables(&self, other: &Snapshot) -> Vec<String> {
        self.table_names
            .union(&other.table_names)
            .filter(|name| {
                self.table_names.contains(*name) != other.table_names.contains(*name)
                    || self.values.get(*name) != other.values.get(*name)
            })
            .cloned()
            .collect()
    }

    /// Hex SHA-256 fingerprint of the canonical form.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Builds invariants once per database, then canonicalizes every
/// registered table that is present.
#[derive(Debug, Clone)]
pub struct SnapshotAssembler {
    pub registry: TableRegistry,
    pub agents: AgentTableSchema,
    pub resources: ResourceTableSchema,
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new(
            TableRegistry::cyclus(),
            AgentTableSchema::default(),
            ResourceTableSchema::default(),
        )
    }
}

impl SnapshotAssembler {
    pub fn new(
        registry: TableRegistry,
        agents: AgentTableSchema,
        resources: ResourceTableSchema,
    ) -> Self {
        Self {
            registry,
            agents,
            resources,
        }
    }

    /// Build both invariant maps. Absent entity tables give empty maps.
    pub fn build_context(&self, reader: &dyn TableReader) -> Result<InvariantContext> {
        let mut ctx = InvariantContext::default();
        if reader.has_table(&self.agents.table)? {
            let table = reader.read_table(&self.agents.table)?;
            ctx.agents = build_agent_invariants(&table, &self.agents)?;
        }
        if reader.has_table(&self.resources.table)? {
            let table = reader.read_table(&self.resources.table)?;
            ctx.resources = build_resource_invariants(&table, &self.resources)?;
        }
        Ok(ctx)
    }

    pub fn assemble(&self, reader: &dyn TableReader) -> Result<Snapshot> {
        let ctx = self.build_context(reader)?;
        let mut snapshot = Snapshot::default();

        for name in reader.table_names()? {
            if self.registry.is_registered(&name) {
                let table = reader.read_table(&name)?;
                if let Some(value) = self.registry.canonicalize(&table, &ctx)? {
                    snapshot.values.insert(name.clone(), value);
                }
            } else {
                debug!(table = %name, "table has no canonical rule");
            }
            snapshot.table_names.insert(name);
        }

        info!(
            source = reader.label(),
            tables = snapshot.table_names.len(),
            canonical = snapshot.values.len(),
            "assembled snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{Column, DataType, Database, FieldValue, Table};

    fn info(duration: i64) -> Table {
        Table::new(
            "Info",
            vec![
                Column::new("InitialYear", DataType::Int),
                Column::new("InitialMonth", DataType::Int),
                Column::new("Duration", DataType::Int),
            ],
        )
        .with_row(vec![
            FieldValue::Int(2000),
            FieldValue::Int(1),
            FieldValue::Int(duration),
        ])
        .unwrap()
    }

    #[test]
    fn test_unregistered_tables_listed_but_not_valued() {
        let db = Database::new("a")
            .with_table(info(10))
            .with_table(Table::new("Custom", vec![]));
        let snapshot = SnapshotAssembler::default().assemble(&db).unwrap();

        assert!(snapshot.table_names().contains("Custom"));
        assert!(snapshot.value("Custom").is_none());
        assert!(snapshot.value("Info").is_some());
    }

    #[test]
    fn test_differing_tables_and_digest() {
        let assembler = SnapshotAssembler::default();
        let a = assembler
            .assemble(&Database::new("a").with_table(info(10)))
            .unwrap();
        let b = assembler
            .assemble(&Database::new("b").with_table(info(12)))
            .unwrap();
        let c = assembler
            .assemble(&Database::new("c").with_table(info(10)))
            .unwrap();

        assert_eq!(a.differing_tables(&b), vec!["Info".to_string()]);
        assert!(a.differing_tables(&c).is_empty());
        assert_eq!(a.digest().unwrap(), c.digest().unwrap());
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap().len(), 64);
    }

    fn float_info(duration: f64) -> Database {
        let table = Table::new(
            "Info",
            vec![
                Column::new("InitialYear", DataType::Int),
                Column::new("InitialMonth", DataType::Int),
                Column::new("Duration", DataType::Float),
            ],
        )
        .with_row(vec![
            FieldValue::Int(2000),
            FieldValue::Int(1),
            FieldValue::Float(duration),
        ])
        .unwrap();
        Database::new("float").with_table(table)
    }

    #[test]
    fn test_digest_separates_non_finite_floats() {
        let assembler = SnapshotAssembler::default();
        let digests: Vec<String> = [f64::INFINITY, f64::NEG_INFINITY, f64::NAN]
            .into_iter()
            .map(|f| assembler.assemble(&float_info(f)).unwrap().digest().unwrap())
            .collect();

        assert_ne!(digests[0], digests[1]);
        assert_ne!(digests[0], digests[2]);
        assert_ne!(digests[1], digests[2]);

        let again = assembler.assemble(&float_info(f64::NAN)).unwrap();
        assert_eq!(again.digest().unwrap(), digests[2]);
    }

    #[test]
    fn test_missing_entity_tables_give_empty_context() {
        let ctx = SnapshotAssembler::default()
            .build_context(&Database::new("empty"))
            .unwrap();
        assert!(ctx.agents.is_empty());
        assert!(ctx.resources.is_empty());
    }
}
