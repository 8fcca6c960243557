//! # Inbound Ports
//!
//! What the record stores and the deployment manager need from the pipeline.

use async_trait::async_trait;
use shared_types::Address;

use crate::domain::errors::PipelineError;
use crate::domain::gas::GasLimitPolicy;
use crate::domain::receipt::Receipt;

/// One write to the chain: recipient (or creation), payload and limit policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub gas_limit: GasLimitPolicy,
}

impl TransactionRequest {
    pub fn call(to: Address, data: Vec<u8>, gas_limit: GasLimitPolicy) -> Self {
        Self {
            to: Some(to),
            data,
            gas_limit,
        }
    }

    pub fn create(init_code: Vec<u8>, gas_limit: GasLimitPolicy) -> Self {
        Self {
            to: None,
            data: init_code,
            gas_limit,
        }
    }
}

/// A receipt plus the details needed to describe how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub receipt: Receipt,
    pub sender: Address,
    pub nonce: u64,
    pub gas_price: shared_types::U256,
    pub gas_limit: u64,
    pub chain_id: u64,
}

/// Signs and submits transactions, returning only successful receipts.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Runs the full pipeline for `request` signed by `private_key_hex`.
    ///
    /// Exactly one broadcast per call; no retries.
    async fn execute(
        &self,
        private_key_hex: &str,
        request: TransactionRequest,
    ) -> Result<ExecutionOutcome, PipelineError>;

    /// Chain id baked into every signature.
    fn chain_id(&self) -> u64;
}
