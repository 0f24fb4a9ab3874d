//! consensus.rs
//!
//! Single-round leader election: propose -> promise -> declareLeader -> agree.
//!
//! Everything in here is synchronous and network-free. The engine consumes
//! decoded messages and answers with the envelopes that should go out; the
//! networked [`Node`](crate::Node) owns the engine behind its proposal lock and
//! ships those envelopes over the transport.

pub mod ballot;
pub mod engine;
pub mod quorum;
pub mod types;
