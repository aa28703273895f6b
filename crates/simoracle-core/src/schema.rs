//! Table and column names of the simulator's output schema, and the
//! per-table descriptions the invariant builders need.

use serde::{Deserialize, Serialize};

pub const AGENT_ENTRY: &str = "AgentEntry";
pub const AGENT_EXIT: &str = "AgentExit";
pub const RESOURCES: &str = "Resources";
pub const TRANSACTIONS: &str = "Transactions";
pub const INFO: &str = "Info";
pub const SIMULATION_TIME_INFO: &str = "SimulationTimeInfo";
pub const ENRICHMENTS: &str = "Enrichments";

/// Column identifying the run that wrote a row. Differs across any two runs.
pub const SIM_ID: &str = "SimId";

/// Parent id marking a root agent.
pub const ROOT_PARENT_ID: i64 = -1;

/// Layout of the agent table used to build agent invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTableSchema {
    pub table: String,
    pub id_column: String,
    pub parent_column: String,
    /// Non-id attributes, in invariant order.
    pub attribute_columns: Vec<String>,
    pub root_parent_id: i64,
}

impl Default for AgentTableSchema {
    fn default() -> Self {
        Self {
            table: AGENT_ENTRY.to_string(),
            id_column: "AgentId".to_string(),
            parent_column: "ParentId".to_string(),
            attribute_columns: ["Kind", "Spec", "Prototype", "Lifetime", "EnterTime"]
                .map(String::from)
                .to_vec(),
            root_parent_id: ROOT_PARENT_ID,
        }
    }
}

/// Layout of the resource table used to build resource invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTableSchema {
    pub table: String,
    pub id_column: String,
    pub attribute_columns: Vec<String>,
}

impl Default for ResourceTableSchema {
    fn default() -> Self {
        Self {
            table: RESOURCES.to_string(),
            id_column: "ResourceId".to_string(),
            attribute_columns: ["Type", "TimeCreated", "Quantity", "Units"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schemas() {
        let agents = AgentTableSchema::default();
        assert_eq!(agents.table, "AgentEntry");
        assert_eq!(agents.root_parent_id, -1);
        assert!(!agents.attribute_columns.contains(&agents.id_column));

        let resources = ResourceTableSchema::default();
        assert_eq!(resources.id_column, "ResourceId");
        assert!(resources.attribute_columns.contains(&"Quantity".to_string()));
    }
}
