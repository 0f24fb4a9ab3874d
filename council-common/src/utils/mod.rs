//! utils.rs
//!
//! Common types shared across the council workspace.
//!
//! Node identity lives here so the transport, the election engine and the
//! driver all agree on how a node is named and printed.

pub mod node_id;
pub use node_id::NodeId;
