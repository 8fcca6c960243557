//! # Pipeline Errors
//!
//! One result type for every stage of the pipeline. Structural errors
//! (bad key, bad address, empty creation payload) never touch the network.
//! Chain errors carry the node's own message.

use shared_types::{hash_hex, Hash, TypeError};
use thiserror::Error;

use crate::ports::outbound::RpcError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Key is not exactly 64 hex characters or is not a valid curve scalar.
    #[error("invalid private key format: expected 64 hex characters")]
    InvalidKeyFormat,

    /// Recipient is not a 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Contract creation without init code.
    #[error("contract creation requires a non-empty payload")]
    EmptyCreationPayload,

    /// Nonce or gas price lookup failed.
    #[error("failed to resolve nonce and gas: {0}")]
    ResolutionFailed(String),

    /// Node refused the raw transaction before any receipt existed.
    #[error("transaction rejected by network: {0}")]
    SubmissionRejected(String),

    /// Mined with `status = false`.
    #[error("transaction {} reverted", hash_hex(.tx_hash))]
    TransactionReverted { tx_hash: Hash },

    /// Transport failure talking to the node.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Raw transaction bytes could not be decoded.
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),
}

impl PipelineError {
    /// True for errors caused by caller input rather than the chain.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidKeyFormat
                | PipelineError::InvalidAddress(_)
                | PipelineError::EmptyCreationPayload
        )
    }

    /// Classifies an RPC failure raised while broadcasting.
    pub fn from_submission(err: RpcError) -> Self {
        match err {
            RpcError::Transport(msg) => PipelineError::NetworkUnavailable(msg),
            RpcError::Rpc { message, .. } => PipelineError::SubmissionRejected(message),
            RpcError::InvalidResponse(msg) => PipelineError::SubmissionRejected(msg),
        }
    }

    /// Classifies an RPC failure raised while waiting for a receipt.
    pub fn from_receipt_poll(err: RpcError) -> Self {
        PipelineError::NetworkUnavailable(err.to_string())
    }
}

impl From<TypeError> for PipelineError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidAddress(value) => PipelineError::InvalidAddress(value),
            other => PipelineError::MalformedTransaction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(PipelineError::InvalidKeyFormat.is_client_error());
        assert!(PipelineError::EmptyCreationPayload.is_client_error());
        assert!(!PipelineError::ResolutionFailed("down".into()).is_client_error());
        assert!(!PipelineError::TransactionReverted { tx_hash: Hash::zero() }.is_client_error());
    }

    #[test]
    fn test_submission_errors_keep_node_message() {
        let rejected = PipelineError::from_submission(RpcError::Rpc {
            code: -32000,
            message: "nonce too low".into(),
        });
        assert_eq!(rejected, PipelineError::SubmissionRejected("nonce too low".into()));

        let transport = PipelineError::from_submission(RpcError::Transport("refused".into()));
        assert!(matches!(transport, PipelineError::NetworkUnavailable(_)));
    }

    #[test]
    fn test_reverted_message_has_full_hash() {
        let err = PipelineError::TransactionReverted { tx_hash: Hash::repeat_byte(0xab) };
        assert!(err.to_string().contains(&"ab".repeat(32)));
    }
}
