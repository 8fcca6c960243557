//! Codec errors.

use shared_types::TypeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Contract return data does not match the expected layout.
    #[error("failed to decode contract data: {0}")]
    DecodeError(String),

    /// Timestamp is neither an ISO-8601 date nor non-negative Unix seconds.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Caller value cannot be coerced to the declared parameter type.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Type string outside the supported ABI subset.
    #[error("unsupported ABI type: {0}")]
    UnsupportedType(String),
}

impl CodecError {
    pub(crate) fn short(needed: usize, available: usize) -> Self {
        CodecError::DecodeError(format!(
            "data too short: need {} bytes, have {}",
            needed, available
        ))
    }
}

impl From<TypeError> for CodecError {
    fn from(err: TypeError) -> Self {
        CodecError::InvalidArgument(err.to_string())
    }
}
