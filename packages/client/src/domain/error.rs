//! Error types for the status domain.

use thiserror::Error;

/// Invalid display group definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group key must not be empty")]
    EmptyKey,

    #[error("group '{0}' has an empty member id")]
    EmptyMember(String),

    #[error("group '{key}' is not an aggregate and needs exactly one member (found {found})")]
    SingleMemberRequired { key: String, found: usize },

    #[error("aggregate group '{0}' needs at least one member")]
    EmptyAggregate(String),
}

/// A frame that could not be turned into a [`StatusMessage`](super::StatusMessage)
#[derive(Debug, Error)]
pub enum MessageError {
    /// Not JSON, or JSON of the wrong shape for its `type`
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// JSON object without a string `type` field
    #[error("frame has no 'type' field")]
    MissingType,

    /// A numeric field carried something that is not a number
    #[error("field '{field}' is not a number: {value}")]
    NotANumber { field: &'static str, value: String },
}

/// Failure at the transport level (connect, read, frame decoding)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("binary frame is not valid UTF-8")]
    InvalidUtf8,
}
