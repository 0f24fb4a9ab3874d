use std::collections::{BTreeMap, HashMap, HashSet};

use council_common::{NodeId, ProposalValue};

/// Majority over the acceptor subset: `floor((peers - proposers) / 2) + 1`.
pub fn required_promises(peers: usize, proposers: usize) -> usize {
    peers.saturating_sub(proposers) / 2 + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumStatus {
    /// Same acceptor, same value: nothing changed.
    Duplicate,
    Pending { received: usize, required: usize },
    /// Quorum was crossed by this promise. Fires once per value.
    Reached { received: usize },
    AlreadyDeclared { received: usize },
}

/// Per-proposer promise tally.
///
/// Promises are counted per distinct acceptor so a replayed `promise` never
/// moves the count. Values that never reach quorum are kept for the lifetime
/// of the node.
#[derive(Debug, Clone)]
pub struct QuorumTracker {
    required: usize,
    promises: HashMap<ProposalValue, HashSet<NodeId>>,
    declared: BTreeMap<ProposalValue, usize>,
}

impl QuorumTracker {
    pub fn new(required: usize) -> Self {
        Self {
            required,
            promises: HashMap::new(),
            declared: BTreeMap::new(),
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn record(&mut self, acceptor: NodeId, value: ProposalValue) -> QuorumStatus {
        let voters = self.promises.entry(value).or_default();
        if !voters.insert(acceptor) {
            return QuorumStatus::Duplicate;
        }

        let received = voters.len();
        if received < self.required {
            return QuorumStatus::Pending { received, required: self.required };
        }

        if self.declared.contains_key(&value) {
            QuorumStatus::AlreadyDeclared { received }
        } else {
            self.declared.insert(value, received);
            QuorumStatus::Reached { received }
        }
    }

    pub fn count(&self, value: ProposalValue) -> usize {
        self.promises.get(&value).map_or(0, HashSet::len)
    }

    pub fn is_declared(&self, value: ProposalValue) -> bool {
        self.declared.contains_key(&value)
    }

    pub fn counts(&self) -> BTreeMap<ProposalValue, usize> {
        self.promises.iter().map(|(v, s)| (*v, s.len())).collect()
    }

    /// Declared values with the tally observed when quorum was crossed.
    pub fn declared(&self) -> &BTreeMap<ProposalValue, usize> {
        &self.declared
    }
}
