use council_p2p::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Unknown scenario {0} (expected 1..=10)")]
    UnknownScenario(u8),

    #[error("Scenario {scenario} references node {node}, but the council only has {count} nodes")]
    NodeOutOfRange { scenario: u8, node: u32, count: usize },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Config error: {0}")]
    Config(#[from] std::io::Error),
}
