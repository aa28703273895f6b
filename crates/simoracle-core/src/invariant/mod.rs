//! Relabeling-independent keys for entities.
//!
//! - `agent`: recursive agent invariants (parent chain folded in)
//! - `resource`: flat resource invariants (id stripped)

pub mod agent;
pub mod resource;

pub use agent::{build_agent_invariants, AgentInvariant, AgentInvariants};
pub use resource::{build_resource_invariants, ResourceInvariant, ResourceInvariants};

/// Both invariant maps for one database, handed to every table rule.
#[derive(Debug, Clone, Default)]
pub struct InvariantContext {
    pub agents: AgentInvariants,
    pub resources: ResourceInvariants,
}
