use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identificador de um nó no conselho (1..=N).
///
/// The id also fixes the node's listening port (`base_port + id`), so it is
/// assigned once by whoever builds the peer table and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(NodeId)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: NodeId = " 7 ".parse().unwrap();
        assert_eq!(id, NodeId(7));
        assert_eq!(id.to_string(), "7");
        assert!("-1".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&NodeId(3)).unwrap();
        assert_eq!(json, "3");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeId(3));
    }
}
