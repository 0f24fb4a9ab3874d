//! simulator.rs
//!
//! Fault-injection seam used by the transport before every transmission.
//!
//! The seam only *decides*: it returns a [`Transit`] for a (source, target)
//! pair. Applying the delay is the sender's job, so a slow peer never stalls
//! the accept loop of the receiving node.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use council_common::NodeId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::NetworkError;

/// Outcome of a simulated hop between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    /// Proceed once the duration has elapsed (zero means immediately).
    Delayed(Duration),
    /// The message must be dropped.
    Unreachable,
}

/// How an offline node is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OfflineMode {
    /// Transits to or from an offline node fail straight away.
    #[default]
    Unreachable,
    /// Offline nodes are just very slow.
    Latency { ms: u64 },
}

pub trait FaultInjector: Send + Sync {
    /// Decides what happens to a message travelling `source -> target`.
    fn transit(&self, source: NodeId, target: NodeId) -> Transit;

    fn is_offline(&self, node: NodeId) -> bool;
}

/// In-process network conditions shared by every node of a run.
#[derive(Debug, Default)]
pub struct NetworkSimulator {
    latencies: RwLock<HashMap<NodeId, Duration>>,
    offline: RwLock<HashSet<NodeId>>,
    jitter: RwLock<Duration>,
    offline_mode: OfflineMode,
}

impl NetworkSimulator {
    pub fn new(offline_mode: OfflineMode) -> Self {
        Self { offline_mode, ..Self::default() }
    }

    pub fn offline_mode(&self) -> OfflineMode {
        self.offline_mode
    }

    /// Every message sent *to* `node` waits this long before dialing.
    pub fn set_latency(&self, node: NodeId, latency: Duration) {
        info!("🐢 Latência do nó {} ajustada para {:?}", node, latency);
        self.latencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node, latency);
    }

    pub fn clear_latency(&self, node: NodeId) {
        self.latencies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&node);
    }

    pub fn latency_of(&self, node: NodeId) -> Duration {
        self.latencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&node)
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Upper bound of the uniform random jitter added to every delayed transit.
    pub fn set_jitter(&self, max: Duration) {
        *self.jitter.write().unwrap_or_else(PoisonError::into_inner) = max;
    }

    pub fn mark_offline(&self, node: NodeId) {
        info!("📴 Nó {} marcado como offline", node);
        self.offline
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node);
    }

    pub fn mark_online(&self, node: NodeId) {
        info!("📶 Nó {} de volta online", node);
        self.offline
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&node);
    }

    /// Waits out the simulated hop the way a sender would.
    ///
    /// Drivers use this to model a proposer that is itself slow to reach its
    /// peers before it starts proposing.
    pub async fn simulate_network(&self, source: NodeId, target: NodeId) -> Result<(), NetworkError> {
        match self.transit(source, target) {
            Transit::Unreachable => Err(NetworkError::Unreachable(target)),
            Transit::Delayed(delay) => {
                if !delay.is_zero() {
                    debug!("simulated hop {} -> {} takes {:?}", source, target, delay);
                    tokio::time::sleep(delay).await;
                }
                Ok(())
            }
        }
    }

    fn jittered(&self, base: Duration) -> Duration {
        let max = *self.jitter.read().unwrap_or_else(PoisonError::into_inner);
        if max.is_zero() {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0..=max.as_millis() as u64);
        base + Duration::from_millis(extra)
    }
}

impl FaultInjector for NetworkSimulator {
    fn transit(&self, source: NodeId, target: NodeId) -> Transit {
        if self.is_offline(source) || self.is_offline(target) {
            return match self.offline_mode {
                OfflineMode::Unreachable => Transit::Unreachable,
                OfflineMode::Latency { ms } => Transit::Delayed(Duration::from_millis(ms)),
            };
        }

        Transit::Delayed(self.jittered(self.latency_of(target)))
    }

    fn is_offline(&self, node: NodeId) -> bool {
        self.offline
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&node)
    }
}
