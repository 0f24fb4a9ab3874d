use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use council_common::{NodeId, ProposalValue};
use serde::{Deserialize, Serialize};

/// Fixed for the node's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Proposer,
    Acceptor,
}

impl Role {
    pub fn for_node(id: NodeId, proposers: &BTreeSet<NodeId>) -> Self {
        if proposers.contains(&id) {
            Role::Proposer
        } else {
            Role::Acceptor
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Proposer => write!(f, "PROPOSER"),
            Role::Acceptor => write!(f, "ACCEPTOR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    /// Built but not listening yet.
    Idle,
    Active,
}

/// What a proposer does with promises that arrive after its value was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationPolicy {
    /// Broadcast `declareLeader` once per value.
    #[default]
    Once,
    /// Re-broadcast on every later promise for an already declared value.
    EveryPromise,
}

/// Read-only view of a node, for drivers and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub role: Role,
    pub status: NodeStatus,
    pub highest_seen: Option<ProposalValue>,
    pub accepted: Option<ProposalValue>,
    /// Distinct promises received per value (proposers only).
    pub promises: BTreeMap<ProposalValue, usize>,
    /// Declared value -> promises held when the declaration fired.
    pub declared: BTreeMap<ProposalValue, usize>,
    pub agreed: BTreeSet<ProposalValue>,
    /// Declarations rejected because a higher value had been seen.
    pub disagreed: BTreeSet<ProposalValue>,
    pub declaration_broadcasts: usize,
    pub required_promises: usize,
}

impl NodeSnapshot {
    pub fn has_declared(&self, value: ProposalValue) -> bool {
        self.declared.contains_key(&value)
    }

    pub fn has_agreed(&self, value: ProposalValue) -> bool {
        self.agreed.contains(&value)
    }
}
