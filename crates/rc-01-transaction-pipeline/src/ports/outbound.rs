//! # Outbound Ports
//!
//! The chain node as seen by the pipeline. Everything else in the workspace
//! reaches the node through this trait, so tests can swap in `MockChain`.

use async_trait::async_trait;
use serde::Serialize;
use shared_types::{Address, Bytes, Hash, U256};
use thiserror::Error;

use crate::domain::receipt::Receipt;

/// Errors surfaced by a [`ChainRpc`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The node could not be reached (connect refused, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered with something that is not a valid response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Parameters for `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    pub data: Bytes,
}

impl CallRequest {
    /// Read-only call against a deployed contract.
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            data: Bytes(data),
            ..Default::default()
        }
    }
}

/// JSON-RPC surface of an Ethereum-compatible node.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// `net_listening`
    async fn is_listening(&self) -> Result<bool, RpcError>;

    /// `eth_blockNumber`
    async fn block_number(&self) -> Result<u64, RpcError>;

    /// `eth_getTransactionCount(address, "pending")`
    async fn pending_transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<U256, RpcError>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError>;

    /// `eth_getBalance(address, "latest")`
    async fn balance(&self, address: Address) -> Result<U256, RpcError>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, RpcError>;

    /// `eth_getTransactionReceipt`, `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, RpcError>;

    /// `eth_call(request, "latest")`
    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError>;
}

/// Wall clock, injectable for deterministic timestamps in tests.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// System clock implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            // Clock before the epoch; report the epoch rather than panic.
            .unwrap_or(0)
    }
}
