use std::collections::BTreeSet;
use std::sync::Arc;

use council_common::NodeId;
use council_p2p::{FaultInjector, NetworkSimulator, P2pConfig, PeerTable};

use crate::cluster::core::Node;
use crate::consensus::types::DeclarationPolicy;

pub struct NodeBuilder {
    id: NodeId,
    peers: Arc<PeerTable>,
    proposers: BTreeSet<NodeId>,
    faults: Option<Arc<dyn FaultInjector>>,
    p2p: P2pConfig,
    policy: DeclarationPolicy,
}

impl NodeBuilder {
    pub fn new(id: NodeId, peers: Arc<PeerTable>) -> Self {
        let p2p = P2pConfig::with_base_port(peers.base_port());
        Self {
            id,
            peers,
            proposers: BTreeSet::new(),
            faults: None,
            p2p,
            policy: DeclarationPolicy::default(),
        }
    }

    pub fn proposers(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.proposers = ids.into_iter().collect();
        self
    }

    /// Shared fault seam. Every node of a run should get the same one.
    pub fn faults(mut self, faults: Arc<dyn FaultInjector>) -> Self {
        self.faults = Some(faults);
        self
    }

    pub fn p2p(mut self, config: P2pConfig) -> Self {
        self.p2p = config;
        self
    }

    pub fn declaration_policy(mut self, policy: DeclarationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Arc<Node> {
        let faults = self
            .faults
            .unwrap_or_else(|| Arc::new(NetworkSimulator::default()));

        Node::with_parts(self.id, self.peers, self.proposers, faults, self.p2p, self.policy)
    }
}
