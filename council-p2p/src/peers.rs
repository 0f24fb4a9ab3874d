use std::net::{IpAddr, SocketAddr};

use council_common::NodeId;

use crate::error::NetworkError;

/// Static, ordered address table agreed on before any node starts.
///
/// Peer `i` (1-based) always listens on `host:base_port + i`. The table is
/// read-only once built and is shared between every node of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerTable {
    base_port: u16,
    addrs: Vec<SocketAddr>,
}

impl PeerTable {
    pub fn new(host: &str, base_port: u16, count: usize) -> Result<Self, NetworkError> {
        let ip: IpAddr = match host {
            "localhost" => IpAddr::from([127, 0, 0, 1]),
            other => other
                .parse()
                .map_err(|_| NetworkError::InvalidHost(other.to_string()))?,
        };

        if base_port as usize + count > u16::MAX as usize {
            return Err(NetworkError::PortOverflow { base: base_port, count });
        }

        let addrs = (1..=count)
            .map(|i| SocketAddr::new(ip, base_port + i as u16))
            .collect();

        Ok(Self { base_port, addrs })
    }

    pub fn localhost(base_port: u16, count: usize) -> Result<Self, NetworkError> {
        Self::new("127.0.0.1", base_port, count)
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    pub fn base_port(&self) -> u16 {
        self.base_port
    }

    pub fn address_of(&self, id: NodeId) -> Option<SocketAddr> {
        let index = (id.get() as usize).checked_sub(1)?;
        self.addrs.get(index).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..=self.addrs.len() as u32).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, SocketAddr)> + '_ {
        self.ids().zip(self.addrs.iter().copied())
    }
}
