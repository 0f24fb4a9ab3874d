use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Network-facing settings shared by every node of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct P2pConfig {
    pub host: String,
    /// Node `i` listens on `base_port + i`.
    pub base_port: u16,
    /// Size of the handler pool per node.
    pub worker_pool_size: usize,
    pub read_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    /// Longest inbound line, newline included.
    pub max_line_bytes: usize,
}

impl Default for P2pConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            base_port: 8000,
            worker_pool_size: 3,
            read_timeout_ms: 5_000,
            connect_timeout_ms: 2_000,
            max_line_bytes: 256,
        }
    }
}

impl P2pConfig {
    pub fn with_base_port(base_port: u16) -> Self {
        Self { base_port, ..Self::default() }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Zero workers would stall every handler forever.
    pub fn workers(&self) -> usize {
        self.worker_pool_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: P2pConfig = serde_json::from_str(r#"{ "base_port": 9100 }"#).unwrap();
        assert_eq!(cfg.base_port, 9100);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.worker_pool_size, 3);
        assert_eq!(cfg.max_line_bytes, 256);
    }

    #[test]
    fn test_workers_never_zero() {
        let cfg = P2pConfig { worker_pool_size: 0, ..P2pConfig::default() };
        assert_eq!(cfg.workers(), 1);
    }
}
