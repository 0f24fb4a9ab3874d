use std::collections::BTreeSet;
use std::sync::Arc;

use council_common::NodeId;
use council_consensus::{Node, NodeBuilder};
use council_p2p::{NetworkSimulator, PeerTable};

use crate::config::Config;
use crate::error::RuntimeError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Every node of one run plus the network conditions they share.
pub struct CouncilRuntime {
    pub peers: Arc<PeerTable>,
    pub simulator: Arc<NetworkSimulator>,
    pub nodes: Vec<Arc<Node>>,
}

impl CouncilRuntime {
    pub fn node(&self, id: NodeId) -> Option<&Arc<Node>> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}

/// Builds and starts `config.node_count` nodes.
///
/// A node whose port cannot be bound is left idle; the rest of the council
/// still runs.
pub async fn build_runtime(config: &Config, proposers: &BTreeSet<NodeId>) -> Result<CouncilRuntime> {
    let peers = Arc::new(PeerTable::new(&config.p2p.host, config.p2p.base_port, config.node_count)?);
    tracing::info!(
        "🔄 Peer table ready: {} nodes on {}:{}+",
        peers.len(),
        config.p2p.host,
        config.p2p.base_port
    );

    for (id, addr) in peers.iter() {
        tracing::debug!("peer {} -> {}", id, addr);
    }

    let simulator = Arc::new(NetworkSimulator::new(config.offline_mode));
    simulator.set_jitter(config.jitter());
    tracing::info!("🧪 Offline nodes modelled as {:?}", simulator.offline_mode());

    let mut nodes = Vec::with_capacity(peers.len());
    for id in peers.ids() {
        let node = NodeBuilder::new(id, Arc::clone(&peers))
            .proposers(proposers.iter().copied())
            .faults(simulator.clone())
            .p2p(config.p2p.clone())
            .declaration_policy(config.declaration_policy)
            .build();

        if let Err(e) = node.start().await {
            tracing::error!("❌ Node {} failed to start: {}", id, e);
        }
        nodes.push(node);
    }

    Ok(CouncilRuntime { peers, simulator, nodes })
}
