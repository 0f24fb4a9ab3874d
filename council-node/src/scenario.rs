//! Built-in election scenarios.
//!
//! Each scenario describes which nodes propose which value, how the network
//! misbehaves, and which hops a proposer has to cross before it gets to
//! propose at all ("warm-up" transits).

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use council_common::{NodeId, ProposalValue};

/// One proposer's part in a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedProposal {
    pub node: NodeId,
    pub value: ProposalValue,
    /// Hops `node -> target` simulated, in order, before proposing.
    pub warmup: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub id: u8,
    pub title: &'static str,
    pub proposals: Vec<PlannedProposal>,
    pub latencies: Vec<(NodeId, Duration)>,
    pub offline: Vec<NodeId>,
}

fn ids(raw: impl IntoIterator<Item = u32>) -> Vec<NodeId> {
    raw.into_iter().map(NodeId).collect()
}

fn ms(node: u32, millis: u64) -> (NodeId, Duration) {
    (NodeId(node), Duration::from_millis(millis))
}

fn proposal(node: u32, value: ProposalValue, warmup: Vec<NodeId>) -> PlannedProposal {
    PlannedProposal { node: NodeId(node), value, warmup }
}

impl Scenario {
    pub fn catalog() -> Vec<Scenario> {
        vec![
            Scenario {
                id: 1,
                title: "single proposer, healthy network",
                proposals: vec![proposal(1, 40, vec![])],
                latencies: vec![],
                offline: vec![],
            },
            Scenario {
                id: 2,
                title: "two proposers at once",
                proposals: vec![proposal(1, 50, vec![]), proposal(2, 30, vec![])],
                latencies: vec![],
                offline: vec![],
            },
            Scenario {
                id: 3,
                title: "one slow acceptor",
                proposals: vec![proposal(1, 40, ids([3]))],
                latencies: vec![ms(3, 500)],
                offline: vec![],
            },
            Scenario {
                id: 4,
                title: "very slow last acceptor",
                proposals: vec![proposal(1, 60, ids([9]))],
                latencies: vec![ms(9, 3000)],
                offline: vec![],
            },
            Scenario {
                id: 5,
                title: "mixed acceptor latencies",
                proposals: vec![proposal(1, 70, ids([3, 5, 7, 9]))],
                latencies: vec![ms(3, 500), ms(5, 1500), ms(7, 3000), ms(9, 1000)],
                offline: vec![],
            },
            Scenario {
                id: 6,
                title: "slow proposer",
                proposals: vec![proposal(2, 80, ids(3..=8))],
                latencies: vec![ms(2, 3000)],
                offline: vec![],
            },
            Scenario {
                id: 7,
                title: "slow proposer and slow acceptors",
                proposals: vec![proposal(2, 80, ids(3..=8))],
                latencies: vec![ms(8, 3000), ms(9, 2000), ms(2, 1000)],
                offline: vec![],
            },
            Scenario {
                id: 8,
                title: "two slow proposers racing",
                proposals: vec![proposal(1, 30, ids([2])), proposal(2, 50, ids([1]))],
                latencies: vec![ms(1, 2000), ms(2, 1000)],
                offline: vec![],
            },
            Scenario {
                id: 9,
                title: "proposer goes offline",
                proposals: vec![proposal(3, 80, ids((1..=8).filter(|i| *i != 3)))],
                latencies: vec![],
                offline: ids([3]),
            },
            Scenario {
                id: 10,
                title: "proposer behind a very slow acceptor",
                proposals: vec![proposal(3, 80, ids((1..=8).flat_map(|i| [5, i])))],
                latencies: vec![ms(2, 5000)],
                offline: vec![],
            },
        ]
    }

    pub fn by_id(id: u8) -> Option<Scenario> {
        Self::catalog().into_iter().find(|s| s.id == id)
    }

    pub fn proposers(&self) -> BTreeSet<NodeId> {
        self.proposals.iter().map(|p| p.node).collect()
    }

    /// Every node id the scenario mentions.
    pub fn referenced_nodes(&self) -> BTreeSet<NodeId> {
        let mut nodes = self.proposers();
        for p in &self.proposals {
            nodes.extend(p.warmup.iter().copied());
        }
        nodes.extend(self.latencies.iter().map(|(n, _)| *n));
        nodes.extend(self.offline.iter().copied());
        nodes
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>2}. {}", self.id, self.title)?;
        for p in &self.proposals {
            write!(f, " | node {} proposes {}", p.node, p.value)?;
        }
        for (node, latency) in &self.latencies {
            write!(f, " | node {} +{}ms", node, latency.as_millis())?;
        }
        for node in &self.offline {
            write!(f, " | node {} offline", node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_unique_scenarios() {
        let catalog = Scenario::catalog();
        assert_eq!(catalog.len(), 10);
        let ids: BTreeSet<u8> = catalog.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=10).collect());
    }

    #[test]
    fn test_every_scenario_fits_nine_nodes() {
        for s in Scenario::catalog() {
            assert!(!s.proposals.is_empty(), "scenario {} has no proposer", s.id);
            for node in s.referenced_nodes() {
                assert!((1..=9).contains(&node.get()), "scenario {} uses node {}", s.id, node);
            }
        }
    }

    #[test]
    fn test_concurrent_scenarios() {
        let two = Scenario::by_id(2).unwrap();
        assert_eq!(two.proposers(), ids([1, 2]).into_iter().collect());

        let eight = Scenario::by_id(8).unwrap();
        assert_eq!(eight.proposals[0].warmup, ids([2]));
        assert_eq!(eight.proposals[1].warmup, ids([1]));
    }

    #[test]
    fn test_offline_proposer_skips_itself_in_warmup() {
        let nine = Scenario::by_id(9).unwrap();
        assert_eq!(nine.offline, ids([3]));
        assert!(!nine.proposals[0].warmup.contains(&NodeId(3)));
        assert_eq!(nine.proposals[0].warmup.len(), 7);
    }

    #[test]
    fn test_interleaved_warmup() {
        let ten = Scenario::by_id(10).unwrap();
        let warmup = &ten.proposals[0].warmup;
        assert_eq!(warmup.len(), 16);
        assert_eq!(&warmup[..4], &ids([5, 1, 5, 2])[..]);
    }

    #[test]
    fn test_unknown_id() {
        assert!(Scenario::by_id(0).is_none());
        assert!(Scenario::by_id(11).is_none());
    }

    #[test]
    fn test_display_lists_faults() {
        let line = Scenario::by_id(4).unwrap().to_string();
        assert!(line.contains("node 1 proposes 60"));
        assert!(line.contains("node 9 +3000ms"));
    }
}
