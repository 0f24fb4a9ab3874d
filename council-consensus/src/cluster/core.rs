use std::sync::Arc;

use council_common::NodeId;
use council_p2p::{FaultInjector, NetworkSimulator, P2pConfig, PeerTable, TcpTransport};
use tokio::sync::{Mutex, RwLock};

use crate::consensus::{
    engine::{ElectionEngine, Envelope},
    types::{DeclarationPolicy, NodeSnapshot, NodeStatus, Role},
};

/// A council member reachable over TCP.
///
/// `engine` is the node's single proposal lock: every handler that reads or
/// mutates ballot state, tallies promises or declares a leader does so while
/// holding it.
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) role: Role,
    pub(crate) transport: TcpTransport,
    pub(crate) engine: Mutex<ElectionEngine>,
    pub(crate) status: RwLock<NodeStatus>,
}

impl Node {
    /// Builds a node with default network settings and no fault injection.
    pub fn new(
        id: NodeId,
        peers: Arc<PeerTable>,
        proposer_ids: impl IntoIterator<Item = NodeId>,
    ) -> Arc<Self> {
        let faults: Arc<dyn FaultInjector> = Arc::new(NetworkSimulator::default());
        Self::with_parts(id, peers, proposer_ids, faults, P2pConfig::default(), DeclarationPolicy::default())
    }

    pub(crate) fn with_parts(
        id: NodeId,
        peers: Arc<PeerTable>,
        proposer_ids: impl IntoIterator<Item = NodeId>,
        faults: Arc<dyn FaultInjector>,
        p2p: P2pConfig,
        policy: DeclarationPolicy,
    ) -> Arc<Self> {
        let engine = ElectionEngine::new(id, peers.ids(), proposer_ids, policy);
        let role = engine.role();
        let transport = TcpTransport::new(id, peers, faults, p2p);

        Arc::new(Self {
            id,
            role,
            transport,
            engine: Mutex::new(engine),
            status: RwLock::new(NodeStatus::Idle),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub async fn status(&self) -> NodeStatus {
        *self.status.read().await
    }

    pub async fn snapshot(&self) -> NodeSnapshot {
        let status = self.status().await;
        self.engine.lock().await.snapshot(status)
    }

    /// Hands every envelope to its own send task.
    ///
    /// Called with the proposal lock held; spawning never blocks, and the
    /// simulated delay is paid by the send task, not by the lock holder.
    pub(crate) fn dispatch(&self, envelopes: Vec<Envelope>) {
        for Envelope { target, message } in envelopes {
            self.transport.spawn_send(target, message);
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
