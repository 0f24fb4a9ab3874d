use std::sync::Arc;
use std::time::Duration;

use council_common::{NodeId, ProposalValue};
use council_consensus::{Node, NodeSnapshot};
use council_p2p::NetworkSimulator;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::RuntimeError;
use crate::runtime::builder::{build_runtime, Result};
use crate::scenario::{PlannedProposal, Scenario};

/// Plays `scenario` for `run_for`, then returns what every node ended up with.
pub async fn run_scenario(config: &Config, scenario: &Scenario, run_for: Duration) -> Result<Vec<NodeSnapshot>> {
    for node in scenario.referenced_nodes() {
        if node.get() == 0 || node.get() as usize > config.node_count {
            return Err(RuntimeError::NodeOutOfRange {
                scenario: scenario.id,
                node: node.get(),
                count: config.node_count,
            });
        }
    }

    info!("🎬 Scenario {}", scenario);
    let runtime = build_runtime(config, &scenario.proposers()).await?;

    for (node, latency) in &scenario.latencies {
        runtime.simulator.set_latency(*node, *latency);
    }
    for node in &scenario.offline {
        runtime.simulator.mark_offline(*node);
    }

    let mut drivers: Vec<JoinHandle<()>> = Vec::new();
    for plan in &scenario.proposals {
        let Some(node) = runtime.node(plan.node).cloned() else {
            continue;
        };
        drivers.push(tokio::spawn(drive_proposer(
            node,
            Arc::clone(&runtime.simulator),
            plan.clone(),
        )));
    }

    tokio::time::sleep(run_for).await;
    for driver in &drivers {
        driver.abort();
    }

    let mut snapshots = Vec::with_capacity(runtime.nodes.len());
    for node in &runtime.nodes {
        let snap = node.snapshot().await;
        info!(
            "📋 Node {} ({}) highest={:?} accepted={:?} promises={:?} declared={:?} agreed={:?} disagreed={:?}",
            snap.id,
            snap.role,
            snap.highest_seen,
            snap.accepted,
            snap.promises,
            snap.declared,
            snap.agreed,
            snap.disagreed
        );
        snapshots.push(snap);
    }

    let chosen = leaders(&snapshots);
    if chosen.is_empty() {
        warn!("🏳️ Scenario {} ended without a leader", scenario.id);
    }
    for (node, value) in &chosen {
        info!("👑 Node {} was declared leader with value {}", node, value);
        info!(target: "consensus", "EVENT:LEADER scenario={} node={} value={}", scenario.id, node, value);
    }

    Ok(snapshots)
}

/// Proposers whose declaration went out, with the declared value.
pub fn leaders(snapshots: &[NodeSnapshot]) -> Vec<(NodeId, ProposalValue)> {
    snapshots
        .iter()
        .flat_map(|s| s.declared.keys().map(move |v| (s.id, *v)))
        .collect()
}

async fn drive_proposer(node: Arc<Node>, simulator: Arc<NetworkSimulator>, plan: PlannedProposal) {
    for target in &plan.warmup {
        if let Err(e) = simulator.simulate_network(plan.node, *target).await {
            warn!("⚠️ Warm-up {} -> {} failed: {}", plan.node, target, e);
        }
    }

    if let Err(e) = node.propose_leadership(plan.value).await {
        error!("❌ Node {} could not propose {}: {}", plan.node, plan.value, e);
    }
}
