pub mod cluster;
pub mod consensus;
pub mod error;

pub use cluster::builder::NodeBuilder;
pub use cluster::core::Node;
pub use consensus::engine::{ElectionEngine, Envelope, Verdict};
pub use consensus::quorum::{required_promises, QuorumStatus, QuorumTracker};
pub use consensus::types::{DeclarationPolicy, NodeSnapshot, NodeStatus, Role};
pub use error::ConsensusError;
