//! # Transaction Pipeline Service
//!
//! ```text
//! execute(key, request)
//!   ├── derive_account(key)            InvalidKeyFormat
//!   ├── check_payload(to, data)        EmptyCreationPayload
//!   ├── AccountQueue::acquire(addr)    one in-flight tx per account
//!   ├── resolve()                      ResolutionFailed
//!   │     ├── eth_getTransactionCount(pending) ⊔ NonceTracker
//!   │     ├── eth_gasPrice → GasPricePolicy
//!   │     └── eth_estimateGas → GasLimitPolicy (falls back, never fails)
//!   ├── build() + sign()
//!   ├── eth_sendRawTransaction         SubmissionRejected | NetworkUnavailable
//!   └── poll eth_getTransactionReceipt TransactionReverted | NetworkUnavailable
//! ```

use async_trait::async_trait;
use shared_types::{address_hex, hash_hex, Bytes, Hash};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::account::{derive_account, Account};
use crate::domain::builder::{build, check_payload};
use crate::domain::envelope::SignedTransaction;
use crate::domain::errors::PipelineError;
use crate::domain::gas::{GasPricePolicy, ResolvedGas};
use crate::domain::nonce::{AccountQueue, NonceTracker};
use crate::domain::receipt::Receipt;
use crate::ports::inbound::{ExecutionOutcome, TransactionRequest, TransactionSubmitter};
use crate::ports::outbound::{CallRequest, ChainRpc};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// EIP-155 chain id used for every signature.
    pub chain_id: u64,
    pub gas_price_policy: GasPricePolicy,
    /// Delay between `eth_getTransactionReceipt` polls.
    pub receipt_poll_interval: Duration,
    /// Upper bound on the receipt wait. `None` waits indefinitely.
    pub receipt_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            gas_price_policy: GasPricePolicy::default(),
            receipt_poll_interval: Duration::from_millis(500),
            receipt_timeout: None,
        }
    }
}

/// Resolves, builds, signs, broadcasts and awaits transactions.
pub struct TransactionPipeline {
    rpc: Arc<dyn ChainRpc>,
    config: PipelineConfig,
    nonces: NonceTracker,
    queue: AccountQueue,
}

impl TransactionPipeline {
    pub fn new(rpc: Arc<dyn ChainRpc>, config: PipelineConfig) -> Self {
        Self {
            rpc,
            config,
            nonces: NonceTracker::new(),
            queue: AccountQueue::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rpc(&self) -> Arc<dyn ChainRpc> {
        Arc::clone(&self.rpc)
    }

    pub fn nonces(&self) -> &NonceTracker {
        &self.nonces
    }

    /// Resolves `{nonce, gas_price, gas_limit}` for `account`.
    ///
    /// Only nonce and gas price lookups can fail; a failed estimate falls back
    /// to the policy's fixed value.
    pub async fn resolve(
        &self,
        account: &Account,
        request: &TransactionRequest,
    ) -> Result<ResolvedGas, PipelineError> {
        let pending = self
            .rpc
            .pending_transaction_count(account.address)
            .await
            .map_err(|e| PipelineError::ResolutionFailed(e.to_string()))?;
        let nonce = self.nonces.reconcile(account.address, pending);

        let reported = self
            .rpc
            .gas_price()
            .await
            .map_err(|e| PipelineError::ResolutionFailed(e.to_string()))?;
        let gas_price = self.config.gas_price_policy.apply(reported);

        let estimate = if request.gas_limit.needs_estimate() {
            let call = CallRequest {
                from: Some(account.address),
                to: request.to,
                gas_price: None,
                data: Bytes(request.data.clone()),
            };
            match self.rpc.estimate_gas(&call).await {
                Ok(estimate) => Some(estimate),
                Err(e) => {
                    warn!(error = %e, "Gas estimation failed, using fallback limit");
                    None
                }
            }
        } else {
            None
        };
        let gas_limit = request.gas_limit.resolve(estimate);

        debug!(
            from = %address_hex(&account.address),
            pending,
            nonce,
            reported_gas_price = %reported,
            gas_price = %gas_price,
            gas_limit,
            "Resolved transaction parameters"
        );

        Ok(ResolvedGas {
            nonce,
            gas_price,
            gas_limit,
        })
    }

    /// Broadcasts a signed transaction and waits for its successful receipt.
    ///
    /// Does not touch the nonce tracker; [`TransactionPipeline::execute`] does.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<Receipt, PipelineError> {
        let tx_hash = self.broadcast(signed).await?;
        let receipt = self.await_receipt(tx_hash).await?;
        Self::classify(receipt)
    }

    async fn broadcast(&self, signed: &SignedTransaction) -> Result<Hash, PipelineError> {
        let tx_hash = self
            .rpc
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(PipelineError::from_submission)?;
        if tx_hash != signed.hash {
            warn!(
                local = %hash_hex(&signed.hash),
                node = %hash_hex(&tx_hash),
                "Node reported a different transaction hash"
            );
        }
        Ok(tx_hash)
    }

    async fn await_receipt(&self, tx_hash: Hash) -> Result<Receipt, PipelineError> {
        let poll = async {
            loop {
                match self.rpc.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return Ok(receipt),
                    Ok(None) => tokio::time::sleep(self.config.receipt_poll_interval).await,
                    Err(e) => return Err(PipelineError::from_receipt_poll(e)),
                }
            }
        };

        match self.config.receipt_timeout {
            Some(limit) => tokio::time::timeout(limit, poll).await.map_err(|_| {
                PipelineError::NetworkUnavailable(format!(
                    "no receipt for {} after {:?}",
                    hash_hex(&tx_hash),
                    limit
                ))
            })?,
            None => poll.await,
        }
    }

    fn classify(receipt: Receipt) -> Result<Receipt, PipelineError> {
        if receipt.succeeded() {
            Ok(receipt)
        } else {
            Err(PipelineError::TransactionReverted {
                tx_hash: receipt.transaction_hash,
            })
        }
    }
}

#[async_trait]
impl TransactionSubmitter for TransactionPipeline {
    async fn execute(
        &self,
        private_key_hex: &str,
        request: TransactionRequest,
    ) -> Result<ExecutionOutcome, PipelineError> {
        let account = derive_account(private_key_hex)?;
        check_payload(request.to.as_ref(), &request.data)?;

        let _turn = self.queue.acquire(account.address).await;

        let resolved = self.resolve(&account, &request).await?;
        let envelope = build(request.to, request.data, &resolved, self.config.chain_id)?;
        let signed = envelope.sign(account.key());

        info!(
            from = %address_hex(&account.address),
            to = %envelope.to.as_ref().map_or_else(|| "<create>".to_string(), address_hex),
            nonce = resolved.nonce,
            gas_price = %resolved.gas_price,
            gas_limit = resolved.gas_limit,
            tx_hash = %hash_hex(&signed.hash),
            "Submitting transaction"
        );

        let tx_hash = match self.broadcast(&signed).await {
            Ok(hash) => {
                self.nonces.commit(account.address, resolved.nonce);
                hash
            }
            Err(e) => {
                self.nonces.invalidate(account.address);
                warn!(error = %e, "Transaction submission failed");
                return Err(e);
            }
        };

        let receipt = Self::classify(self.await_receipt(tx_hash).await?)?;
        info!(
            tx_hash = %hash_hex(&receipt.transaction_hash),
            block_number = receipt.block_number,
            gas_used = receipt.gas_used,
            gas_limit = resolved.gas_limit,
            "Transaction mined"
        );

        Ok(ExecutionOutcome {
            receipt,
            sender: account.address,
            nonce: resolved.nonce,
            gas_price: resolved.gas_price,
            gas_limit: resolved.gas_limit,
            chain_id: self.config.chain_id,
        })
    }

    fn chain_id(&self) -> u64 {
        self.config.chain_id
    }
}
