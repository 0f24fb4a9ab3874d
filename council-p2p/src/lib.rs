pub mod config;
pub mod error;
pub mod peers;
pub mod ports;
pub mod simulator;
pub mod transport;

pub use config::P2pConfig;
pub use error::NetworkError;
pub use peers::PeerTable;
pub use ports::MessageHandler;
pub use simulator::{FaultInjector, NetworkSimulator, OfflineMode, Transit};
pub use transport::TcpTransport;
