use std::num::ParseIntError;

use thiserror::Error;

/// Errors produced while decoding a `type:senderId:value` line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty message")]
    Empty,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unknown message kind `{0}`")]
    UnknownKind(String),

    /// A numeric field did not parse as a base-10 integer.
    #[error("invalid integer in field `{field}`: {source}")]
    InvalidInteger {
        field: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("unexpected trailing field `{0}`")]
    TrailingField(String),
}
