//! # Error Types
//!
//! Parse failures for the shared primitives.

use thiserror::Error;

/// Errors raised while parsing chain primitives or contract types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Not a 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Not a hex or decimal quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Malformed hex payload.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Contract type outside the fixed catalogue.
    #[error("unknown contract type '{0}'")]
    UnknownContractType(String),
}
