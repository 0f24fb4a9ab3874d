use council_common::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Peer {0} not found")]
    PeerNotFound(NodeId),

    /// The fault-injection seam refused the transit.
    #[error("Peer {0} is unreachable")]
    Unreachable(NodeId),

    #[error("Timed out talking to peer {0}")]
    Timeout(NodeId),

    #[error("Inbound line longer than {0} bytes")]
    LineTooLong(usize),

    #[error("Invalid host `{0}`")]
    InvalidHost(String),

    #[error("Port range overflow: base {base} + {count} nodes")]
    PortOverflow { base: u16, count: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
