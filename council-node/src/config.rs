use std::{fs, io, path::Path, time::Duration};

use council_consensus::DeclarationPolicy;
use council_p2p::{OfflineMode, P2pConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub node_count: usize,
    pub p2p: P2pConfig,
    pub declaration_policy: DeclarationPolicy,
    pub offline_mode: OfflineMode,
    /// Upper bound of random extra latency per message.
    pub jitter_ms: u64,
    pub run_for_secs: u64,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_count: 9,
            p2p: P2pConfig::default(),
            declaration_policy: DeclarationPolicy::Once,
            offline_mode: OfflineMode::Unreachable,
            jitter_ms: 0,
            run_for_secs: 20,
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn run_for(&self) -> Duration {
        Duration::from_secs(self.run_for_secs)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str::<Config>(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// A missing file is not an error; a broken one is.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        match Self::load_from_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.json");

        let mut cfg = Config::default();
        cfg.p2p.base_port = 9300;
        cfg.declaration_policy = DeclarationPolicy::EveryPromise;
        cfg.offline_mode = OfflineMode::Latency { ms: 100_000 };
        cfg.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.p2p.base_port, 9300);
        assert_eq!(loaded.declaration_policy, DeclarationPolicy::EveryPromise);
        assert_eq!(loaded.offline_mode, OfflineMode::Latency { ms: 100_000 });
        assert_eq!(loaded.node_count, 9);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_or_default(dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg.run_for_secs, 20);
        assert_eq!(cfg.p2p.base_port, 8000);
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_or_default(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "run_for_secs": 3, "p2p": { "base_port": 9400 } }"#).unwrap();

        let cfg = Config::load_from_file(&path).unwrap();
        assert_eq!(cfg.run_for_secs, 3);
        assert_eq!(cfg.p2p.base_port, 9400);
        assert_eq!(cfg.p2p.worker_pool_size, 3);
        assert_eq!(cfg.node_count, 9);
    }
}
