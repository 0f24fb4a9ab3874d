pub mod env;
pub mod error;
pub mod utils;

pub use env::message::{Message, MessageKind, ProposalValue};
pub use error::CodecError;
pub use utils::NodeId;
