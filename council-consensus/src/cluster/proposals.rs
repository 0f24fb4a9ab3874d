use std::sync::Arc;

use council_common::ProposalValue;
use tracing::{info, warn};

use crate::cluster::core::Node;
use crate::consensus::types::NodeStatus;
use crate::error::{ConsensusError, Result};

impl Node {
    /// Binds `base_port + id` and spawns the accept loop.
    ///
    /// Bind failure is the only fatal error of a node.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        let mut status = self.status.write().await;
        if *status == NodeStatus::Active {
            warn!("⚠️ Node {} already started", self.id);
            return Ok(());
        }

        let listener = self.transport.bind().await?;
        let addr = self.transport.local_addr()?;
        self.transport.serve(listener, Arc::clone(self));
        *status = NodeStatus::Active;

        info!("🚀 Node {} started as {}, listening on port {}", self.id, self.role, addr.port());
        Ok(())
    }

    /// One-shot broadcast of `propose:<id>:<value>` to every acceptor.
    pub async fn propose_leadership(&self, value: ProposalValue) -> Result<()> {
        self.ensure_active().await?;

        let mut engine = self.engine.lock().await;
        let envelopes = engine.propose(value)?;
        self.dispatch(envelopes);
        Ok(())
    }

    /// Sends `accept:<id>:<value>` to every acceptor.
    pub async fn request_accept(&self, value: ProposalValue) -> Result<()> {
        self.ensure_active().await?;

        let mut engine = self.engine.lock().await;
        let envelopes = engine.request_accept(value)?;
        self.dispatch(envelopes);
        Ok(())
    }

    async fn ensure_active(&self) -> Result<()> {
        match self.status().await {
            NodeStatus::Active => Ok(()),
            NodeStatus::Idle => Err(ConsensusError::NotStarted(self.id)),
        }
    }
}
