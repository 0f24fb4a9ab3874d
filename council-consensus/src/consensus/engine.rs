use std::collections::BTreeSet;

use council_common::{Message, MessageKind, NodeId, ProposalValue};
use tracing::{debug, info, warn};

use crate::error::{ConsensusError, Result};

use super::{
    ballot::AcceptorBallot,
    quorum::{required_promises, QuorumStatus, QuorumTracker},
    types::{DeclarationPolicy, NodeSnapshot, NodeStatus, Role},
};

/// A message addressed to one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub target: NodeId,
    pub message: Message,
}

/// How a node reacted to a leader declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Agreed,
    Disagreed,
    /// The value had already been agreed; nothing to do.
    AlreadyAgreed,
}

/// Estado de eleição de um nó.
///
/// Holds the ballot, the agreed set and, for proposers, the promise tally.
/// Every method is meant to run while the caller holds the node's proposal
/// lock, which makes the quorum check and the declaration one atomic step.
#[derive(Debug, Clone)]
pub struct ElectionEngine {
    id: NodeId,
    role: Role,
    peers: Vec<NodeId>,
    proposers: BTreeSet<NodeId>,
    ballot: AcceptorBallot,
    tracker: Option<QuorumTracker>,
    agreed: BTreeSet<ProposalValue>,
    disagreed: BTreeSet<ProposalValue>,
    policy: DeclarationPolicy,
    declaration_broadcasts: usize,
}

impl ElectionEngine {
    pub fn new(
        id: NodeId,
        peers: impl IntoIterator<Item = NodeId>,
        proposers: impl IntoIterator<Item = NodeId>,
        policy: DeclarationPolicy,
    ) -> Self {
        let peers: Vec<NodeId> = peers.into_iter().collect();
        // Ids outside the peer table can never answer, so they do not count.
        let proposers: BTreeSet<NodeId> = proposers
            .into_iter()
            .filter(|p| peers.contains(p))
            .collect();
        let role = Role::for_node(id, &proposers);

        let tracker = match role {
            Role::Proposer => Some(QuorumTracker::new(required_promises(peers.len(), proposers.len()))),
            Role::Acceptor => None,
        };

        Self {
            id,
            role,
            peers,
            proposers,
            ballot: AcceptorBallot::new(),
            tracker,
            agreed: BTreeSet::new(),
            disagreed: BTreeSet::new(),
            policy,
            declaration_broadcasts: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn ballot(&self) -> &AcceptorBallot {
        &self.ballot
    }

    pub fn required_promises(&self) -> usize {
        match &self.tracker {
            Some(tracker) => tracker.required(),
            None => required_promises(self.peers.len(), self.proposers.len()),
        }
    }

    pub fn acceptors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.peers.iter().copied().filter(|p| !self.proposers.contains(p))
    }

    /// Builds the one-shot `propose` broadcast to every acceptor.
    pub fn propose(&mut self, value: ProposalValue) -> Result<Vec<Envelope>> {
        self.ensure_proposer()?;

        info!("📣 PROPOSER Node {} is proposing leadership for value {}", self.id, value);
        tracing::info!(target: "consensus", "EVENT:PROPOSE node={} value={}", self.id, value);

        Ok(self.to_acceptors(Message::propose(self.id, value)))
    }

    /// Late re-affirmation: `accept` to every acceptor.
    pub fn request_accept(&mut self, value: ProposalValue) -> Result<Vec<Envelope>> {
        self.ensure_proposer()?;

        info!("🔁 PROPOSER Node {} re-affirming value {}", self.id, value);
        Ok(self.to_acceptors(Message::accept(self.id, value)))
    }

    /// Routes an inbound message according to this node's role.
    pub fn on_message(&mut self, message: Message) -> Vec<Envelope> {
        let Message { kind, sender, value } = message;

        match (self.role, kind) {
            (Role::Acceptor, MessageKind::Propose) => self.on_proposal(sender, value),
            (Role::Acceptor, MessageKind::Accept) => self.on_accept(sender, value),
            (Role::Proposer, MessageKind::Promise) => self.on_promise(sender, value),
            (_, MessageKind::DeclareLeader) => {
                if self.on_leader_declaration(sender, value) == Verdict::AlreadyAgreed {
                    debug!("node {} already agreed with {} from {}", self.id, value, sender);
                }
                Vec::new()
            }
            (role, kind) => {
                debug!("node {} ({}) ignores {} from {}", self.id, role, kind, sender);
                Vec::new()
            }
        }
    }

    pub fn on_proposal(&mut self, proposer: NodeId, value: ProposalValue) -> Vec<Envelope> {
        info!(
            "📥 ACCEPTOR Node {} received proposal from PROPOSER Node {} with value: {}",
            self.id, proposer, value
        );

        if !self.ballot.offer(value) {
            // No NACK: the proposer just never hears back.
            debug!(
                "node {} ignores proposal {} (highest seen {:?})",
                self.id, value, self.ballot.highest_seen()
            );
            return Vec::new();
        }

        info!("✅ ACCEPTOR Node {} accepts proposal {} from PROPOSER Node {}", self.id, value, proposer);
        self.reply_promise(proposer, value)
    }

    pub fn on_accept(&mut self, proposer: NodeId, value: ProposalValue) -> Vec<Envelope> {
        if !self.ballot.offer(value) {
            return Vec::new();
        }

        info!("✅ ACCEPTOR Node {} accepts late value {} from PROPOSER Node {}", self.id, value, proposer);
        self.reply_promise(proposer, value)
    }

    pub fn on_promise(&mut self, acceptor: NodeId, value: ProposalValue) -> Vec<Envelope> {
        if !self.acceptors().any(|a| a == acceptor) {
            warn!("⚠️ Node {} ignored promise from non-acceptor {}", self.id, acceptor);
            return Vec::new();
        }

        let Some(tracker) = self.tracker.as_mut() else {
            return Vec::new();
        };

        info!(
            "📨 PROPOSER Node {} received promise from ACCEPTOR Node {} with value: {}",
            self.id, acceptor, value
        );
        tracing::info!(target: "consensus", "EVENT:PROMISE node={} from={} value={}", self.id, acceptor, value);

        let status = tracker.record(acceptor, value);
        let declared = tracker.is_declared(value);

        match status {
            QuorumStatus::Reached { received } => {
                info!(
                    "👑 Node {} is declaring itself as the leader for proposal value {} ({} promises)",
                    self.id, value, received
                );
                tracing::info!(target: "consensus", "EVENT:DECLARE node={} value={} promises={}", self.id, value, received);
                self.declare_leader(value)
            }
            QuorumStatus::AlreadyDeclared { .. } | QuorumStatus::Duplicate
                if declared && self.policy == DeclarationPolicy::EveryPromise =>
            {
                self.declare_leader(value)
            }
            QuorumStatus::Pending { received, required } => {
                debug!("node {}: value {} has {}/{} promises", self.id, value, received, required);
                Vec::new()
            }
            QuorumStatus::Duplicate => {
                debug!("node {}: duplicate promise from {} for {}", self.id, acceptor, value);
                Vec::new()
            }
            QuorumStatus::AlreadyDeclared { .. } => Vec::new(),
        }
    }

    pub fn on_leader_declaration(&mut self, leader: NodeId, value: ProposalValue) -> Verdict {
        if self.agreed.contains(&value) {
            return Verdict::AlreadyAgreed;
        }

        if self.ballot.observe_declaration(value) {
            self.agreed.insert(value);
            info!("🤝 Node {} agrees with leader declaration: Node {} is the leader.", self.id, leader);
            tracing::info!(target: "consensus", "EVENT:AGREE node={} leader={} value={}", self.id, leader, value);
            Verdict::Agreed
        } else {
            self.disagreed.insert(value);
            info!("🙅 Node {} disagrees with leader declaration: Node {} is not the leader.", self.id, leader);
            tracing::info!(target: "consensus", "EVENT:DISAGREE node={} leader={} value={}", self.id, leader, value);
            Verdict::Disagreed
        }
    }

    pub fn snapshot(&self, status: NodeStatus) -> NodeSnapshot {
        let (promises, declared) = match &self.tracker {
            Some(t) => (t.counts(), t.declared().clone()),
            None => Default::default(),
        };

        NodeSnapshot {
            id: self.id,
            role: self.role,
            status,
            highest_seen: self.ballot.highest_seen(),
            accepted: self.ballot.accepted(),
            promises,
            declared,
            agreed: self.agreed.clone(),
            disagreed: self.disagreed.clone(),
            declaration_broadcasts: self.declaration_broadcasts,
            required_promises: self.required_promises(),
        }
    }

    fn declare_leader(&mut self, value: ProposalValue) -> Vec<Envelope> {
        self.declaration_broadcasts += 1;
        let message = Message::declare_leader(self.id, value);
        self.peers
            .iter()
            .map(|&target| Envelope { target, message })
            .collect()
    }

    fn reply_promise(&self, proposer: NodeId, value: ProposalValue) -> Vec<Envelope> {
        if !self.peers.contains(&proposer) {
            warn!("⚠️ Node {} cannot answer unknown proposer {}", self.id, proposer);
            return Vec::new();
        }
        vec![Envelope { target: proposer, message: Message::promise(self.id, value) }]
    }

    fn to_acceptors(&self, message: Message) -> Vec<Envelope> {
        self.acceptors()
            .map(|target| Envelope { target, message })
            .collect()
    }

    fn ensure_proposer(&self) -> Result<()> {
        match self.role {
            Role::Proposer => Ok(()),
            Role::Acceptor => Err(ConsensusError::NotProposer(self.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<NodeId> {
        range.map(NodeId).collect()
    }

    fn engine(id: u32, proposers: &[u32], policy: DeclarationPolicy) -> ElectionEngine {
        ElectionEngine::new(
            NodeId(id),
            ids(1..=9),
            proposers.iter().copied().map(NodeId),
            policy,
        )
    }

    #[test]
    fn test_propose_goes_to_acceptors_only() {
        let mut proposer = engine(1, &[1, 2], DeclarationPolicy::Once);
        let out = proposer.propose(50).unwrap();

        let targets: Vec<_> = out.iter().map(|e| e.target).collect();
        assert_eq!(targets, ids(3..=9));
        assert!(out.iter().all(|e| e.message == Message::propose(NodeId(1), 50)));
    }

    #[test]
    fn test_acceptor_cannot_propose() {
        let mut acceptor = engine(4, &[1], DeclarationPolicy::Once);
        assert!(matches!(acceptor.propose(40), Err(ConsensusError::NotProposer(NodeId(4)))));
        assert!(matches!(acceptor.request_accept(40), Err(ConsensusError::NotProposer(_))));
    }

    #[test]
    fn test_acceptor_promises_only_strictly_higher() {
        let mut acceptor = engine(4, &[1, 2], DeclarationPolicy::Once);

        let out = acceptor.on_message(Message::propose(NodeId(2), 30));
        assert_eq!(out, vec![Envelope { target: NodeId(2), message: Message::promise(NodeId(4), 30) }]);

        assert!(acceptor.on_message(Message::propose(NodeId(1), 30)).is_empty());
        assert!(acceptor.on_message(Message::propose(NodeId(1), 20)).is_empty());

        let out = acceptor.on_message(Message::propose(NodeId(1), 50));
        assert_eq!(out[0].target, NodeId(1));
        assert_eq!(acceptor.ballot().highest_seen(), Some(50));
        assert_eq!(acceptor.ballot().accepted(), Some(50));
    }

    #[test]
    fn test_accept_path_behaves_like_proposal() {
        let mut acceptor = engine(5, &[1], DeclarationPolicy::Once);
        acceptor.on_message(Message::propose(NodeId(1), 40));

        assert!(acceptor.on_message(Message::accept(NodeId(1), 40)).is_empty());
        let out = acceptor.on_message(Message::accept(NodeId(1), 45));
        assert_eq!(out, vec![Envelope { target: NodeId(1), message: Message::promise(NodeId(5), 45) }]);
    }

    #[test]
    fn test_proposer_ignores_accept_and_propose() {
        let mut proposer = engine(1, &[1], DeclarationPolicy::Once);
        assert!(proposer.on_message(Message::accept(NodeId(2), 99)).is_empty());
        assert!(proposer.on_message(Message::propose(NodeId(2), 99)).is_empty());
        assert_eq!(proposer.ballot().highest_seen(), None);
    }

    #[test]
    fn test_declares_after_majority_of_acceptors() {
        let mut proposer = engine(1, &[1], DeclarationPolicy::Once);
        assert_eq!(proposer.required_promises(), 5);

        for acceptor in 2..=5 {
            assert!(proposer.on_message(Message::promise(NodeId(acceptor), 40)).is_empty());
        }

        let out = proposer.on_message(Message::promise(NodeId(6), 40));
        let targets: Vec<_> = out.iter().map(|e| e.target).collect();
        assert_eq!(targets, ids(1..=9));
        assert!(out.iter().all(|e| e.message == Message::declare_leader(NodeId(1), 40)));

        let snap = proposer.snapshot(NodeStatus::Active);
        assert_eq!(snap.declared.get(&40), Some(&5));
        assert_eq!(snap.declaration_broadcasts, 1);
    }

    #[test]
    fn test_late_and_duplicate_promises_do_not_redeclare() {
        let mut proposer = engine(1, &[1], DeclarationPolicy::Once);
        for acceptor in 2..=6 {
            proposer.on_message(Message::promise(NodeId(acceptor), 40));
        }

        assert!(proposer.on_message(Message::promise(NodeId(7), 40)).is_empty());
        assert!(proposer.on_message(Message::promise(NodeId(7), 40)).is_empty());
        assert!(proposer.on_message(Message::promise(NodeId(2), 40)).is_empty());

        let snap = proposer.snapshot(NodeStatus::Active);
        assert_eq!(snap.promises.get(&40), Some(&6));
        assert_eq!(snap.declaration_broadcasts, 1);
    }

    #[test]
    fn test_every_promise_policy_rebroadcasts() {
        let mut proposer = engine(1, &[1], DeclarationPolicy::EveryPromise);
        for acceptor in 2..=6 {
            proposer.on_message(Message::promise(NodeId(acceptor), 40));
        }

        assert_eq!(proposer.on_message(Message::promise(NodeId(7), 40)).len(), 9);
        assert_eq!(proposer.snapshot(NodeStatus::Active).declaration_broadcasts, 2);
    }

    #[test]
    fn test_promise_from_proposer_is_not_counted() {
        let mut proposer = engine(1, &[1, 2], DeclarationPolicy::Once);
        proposer.on_message(Message::promise(NodeId(2), 50));
        assert!(proposer.snapshot(NodeStatus::Active).promises.is_empty());
    }

    #[test]
    fn test_promise_to_acceptor_is_ignored() {
        let mut acceptor = engine(3, &[1], DeclarationPolicy::Once);
        assert!(acceptor.on_message(Message::promise(NodeId(4), 10)).is_empty());
        assert!(acceptor.snapshot(NodeStatus::Active).promises.is_empty());
    }

    #[test]
    fn test_leader_declaration_verdicts() {
        let mut acceptor = engine(3, &[1], DeclarationPolicy::Once);
        acceptor.on_message(Message::propose(NodeId(1), 50));

        assert_eq!(acceptor.on_leader_declaration(NodeId(2), 40), Verdict::Disagreed);
        assert_eq!(acceptor.on_leader_declaration(NodeId(1), 50), Verdict::Agreed);
        assert_eq!(acceptor.on_leader_declaration(NodeId(1), 50), Verdict::AlreadyAgreed);

        // catch up to a value never proposed to us
        assert_eq!(acceptor.on_leader_declaration(NodeId(2), 70), Verdict::Agreed);
        assert_eq!(acceptor.ballot().highest_seen(), Some(70));
        assert_eq!(acceptor.ballot().accepted(), Some(50));

        let snap = acceptor.snapshot(NodeStatus::Active);
        assert!(snap.has_agreed(50) && snap.has_agreed(70) && !snap.has_agreed(40));
        assert_eq!(snap.disagreed, BTreeSet::from([40]));
    }

    #[test]
    fn test_proposer_also_evaluates_declarations() {
        let mut other = engine(2, &[1, 2], DeclarationPolicy::Once);
        let out = other.on_message(Message::declare_leader(NodeId(1), 50));
        assert!(out.is_empty());
        assert!(other.snapshot(NodeStatus::Active).has_agreed(50));
    }

    #[test]
    fn test_trackers_are_per_proposer() {
        let mut one = engine(1, &[1, 2], DeclarationPolicy::Once);
        let mut two = engine(2, &[1, 2], DeclarationPolicy::Once);

        for acceptor in 3..=6 {
            one.on_message(Message::promise(NodeId(acceptor), 50));
        }
        two.on_message(Message::promise(NodeId(3), 30));

        let a = one.snapshot(NodeStatus::Active);
        let b = two.snapshot(NodeStatus::Active);
        assert!(a.has_declared(50));
        assert!(!a.promises.contains_key(&30));
        assert_eq!(b.promises.get(&30), Some(&1));
        assert!(!b.promises.contains_key(&50));
        assert!(b.declared.is_empty());
    }

    #[test]
    fn test_same_value_is_tallied_per_proposer() {
        // 9 nodes, 2 proposers: 4 promises needed
        let mut one = engine(1, &[1, 2], DeclarationPolicy::Once);
        let mut two = engine(2, &[1, 2], DeclarationPolicy::Once);

        for acceptor in [3, 4] {
            assert!(one.on_message(Message::promise(NodeId(acceptor), 50)).is_empty());
        }
        for acceptor in [5, 6] {
            assert!(two.on_message(Message::promise(NodeId(acceptor), 50)).is_empty());
        }

        for snap in [one.snapshot(NodeStatus::Active), two.snapshot(NodeStatus::Active)] {
            assert_eq!(snap.required_promises, 4);
            assert_eq!(snap.promises.get(&50), Some(&2));
            assert!(snap.declared.is_empty(), "node {} declared early", snap.id);
            assert_eq!(snap.declaration_broadcasts, 0);
        }
    }

    #[test]
    fn test_unknown_proposer_gets_no_reply() {
        let mut acceptor = engine(3, &[1], DeclarationPolicy::Once);
        assert!(acceptor.on_message(Message::propose(NodeId(42), 10)).is_empty());
        // still adopted, just nobody to answer
        assert_eq!(acceptor.ballot().highest_seen(), Some(10));
    }
}
