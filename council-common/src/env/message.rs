//! message.rs
//!
//! Wire representation of the election protocol.
//!
//! Every message travels alone on its own connection as a single ASCII line:
//!
//! ```text
//! <type>:<senderId>:<value>\n
//! ```
//!
//! where `type` is one of `propose`, `promise`, `accept` or `declareLeader`
//! and both numeric fields are base-10 integers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::utils::NodeId;

/// Value carried by a proposal. Doubles as the ballot number.
pub type ProposalValue = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Proposer -> acceptors: "consider this value".
    Propose,
    /// Acceptor -> proposer: commitment to the value.
    Promise,
    /// Proposer -> acceptors: late re-affirmation of a value.
    Accept,
    /// Proposer -> everyone: the value reached quorum.
    DeclareLeader,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Propose => "propose",
            MessageKind::Promise => "promise",
            MessageKind::Accept => "accept",
            MessageKind::DeclareLeader => "declareLeader",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "propose" => Ok(MessageKind::Propose),
            "promise" => Ok(MessageKind::Promise),
            "accept" => Ok(MessageKind::Accept),
            "declareLeader" => Ok(MessageKind::DeclareLeader),
            other => Err(CodecError::UnknownKind(other.to_string())),
        }
    }
}

/// A single protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub sender: NodeId,
    pub value: ProposalValue,
}

impl Message {
    pub fn new(kind: MessageKind, sender: NodeId, value: ProposalValue) -> Self {
        Self { kind, sender, value }
    }

    pub fn propose(sender: NodeId, value: ProposalValue) -> Self {
        Self::new(MessageKind::Propose, sender, value)
    }

    pub fn promise(sender: NodeId, value: ProposalValue) -> Self {
        Self::new(MessageKind::Promise, sender, value)
    }

    pub fn accept(sender: NodeId, value: ProposalValue) -> Self {
        Self::new(MessageKind::Accept, sender, value)
    }

    pub fn declare_leader(sender: NodeId, value: ProposalValue) -> Self {
        Self::new(MessageKind::DeclareLeader, sender, value)
    }

    /// Encodes the message as a newline-terminated wire line.
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind, self.sender, self.value)
    }
}

impl FromStr for Message {
    type Err = CodecError;

    /// Parses one line. A trailing `\n` or `\r\n` is tolerated.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(CodecError::Empty);
        }

        let mut parts = line.split(':');

        let kind = parts
            .next()
            .ok_or(CodecError::MissingField("type"))?
            .trim()
            .parse::<MessageKind>()?;

        let sender = parts
            .next()
            .ok_or(CodecError::MissingField("senderId"))?
            .parse::<NodeId>()
            .map_err(|source| CodecError::InvalidInteger { field: "senderId", source })?;

        let value = parts
            .next()
            .ok_or(CodecError::MissingField("value"))?
            .trim()
            .parse::<ProposalValue>()
            .map_err(|source| CodecError::InvalidInteger { field: "value", source })?;

        if let Some(extra) = parts.next() {
            return Err(CodecError::TrailingField(extra.to_string()));
        }

        Ok(Message { kind, sender, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_wire_format() {
        let msg = Message::declare_leader(NodeId(1), 40);
        assert_eq!(msg.to_string(), "declareLeader:1:40");
        assert_eq!(msg.to_line(), "declareLeader:1:40\n");
    }

    #[test]
    fn test_decode_each_kind() {
        let cases = [
            ("propose:1:40\n", MessageKind::Propose),
            ("promise:4:40", MessageKind::Promise),
            ("accept:2:55\r\n", MessageKind::Accept),
            ("declareLeader:1:40\n", MessageKind::DeclareLeader),
        ];

        for (line, kind) in cases {
            let msg: Message = line.parse().unwrap();
            assert_eq!(msg.kind, kind, "line {:?}", line);
        }

        let msg: Message = "promise:4:40".parse().unwrap();
        assert_eq!(msg.sender, NodeId(4));
        assert_eq!(msg.value, 40);
    }

    #[test]
    fn test_decode_missing_value() {
        let err = "propose:1".parse::<Message>().unwrap_err();
        assert_eq!(err, CodecError::MissingField("value"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!("".parse::<Message>().unwrap_err(), CodecError::Empty);
        assert_eq!("\n".parse::<Message>().unwrap_err(), CodecError::Empty);
        assert!(matches!(
            "vote:1:2".parse::<Message>(),
            Err(CodecError::UnknownKind(k)) if k == "vote"
        ));
        assert!(matches!(
            "propose:one:2".parse::<Message>(),
            Err(CodecError::InvalidInteger { field: "senderId", .. })
        ));
        assert!(matches!(
            "propose:1:forty".parse::<Message>(),
            Err(CodecError::InvalidInteger { field: "value", .. })
        ));
        assert!(matches!(
            "propose:1:2:3".parse::<Message>(),
            Err(CodecError::TrailingField(f)) if f == "3"
        ));
    }

    #[test]
    fn test_negative_values_are_legal_integers() {
        let msg: Message = "propose:1:-5".parse().unwrap();
        assert_eq!(msg.value, -5);
    }
}
