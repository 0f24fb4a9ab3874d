use council_common::NodeId;
use council_p2p::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("Node {0} is not a proposer")]
    NotProposer(NodeId),

    #[error("Node {0} has not been started")]
    NotStarted(NodeId),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
