//! # In-Memory Chain
//!
//! `MockChain` implements [`ChainRpc`] with instant mining. It decodes every raw
//! transaction it receives, recovers the sender and enforces strict nonce
//! ordering, so tests exercise the real signing path end to end.
//!
//! Contract behaviour is delegated to an optional [`ContractHost`]; without one
//! every call succeeds and every read returns empty data.

use async_trait::async_trait;
use parking_lot::Mutex;
use rlp::RlpStream;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash, U256};
use std::collections::HashMap;

use crate::domain::envelope::{decode_signed, DecodedTransaction};
use crate::domain::receipt::Receipt;
use crate::ports::outbound::{CallRequest, ChainRpc, RpcError};

/// Contract execution plugged into [`MockChain`].
pub trait ContractHost: Send {
    /// Creation transaction; `false` reverts it.
    fn deploy(&mut self, address: Address, init_code: &[u8]) -> bool;

    /// State-changing call; `false` reverts it.
    fn transact(&mut self, to: Address, data: &[u8]) -> bool;

    /// Read-only call; `Err` becomes an execution-reverted RPC error.
    fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, String>;
}

/// `keccak256(rlp([sender, nonce]))[12..]`
pub fn create_address(sender: Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender);
    stream.append(&nonce);
    let hash = Keccak256::digest(stream.as_raw());
    Address::from_slice(&hash[12..])
}

struct MockState {
    next_nonce: HashMap<Address, u64>,
    gas_price: U256,
    estimate: Option<u64>,
    balance: U256,
    block_number: u64,
    receipts: HashMap<Hash, Receipt>,
    receipt_polls: HashMap<Hash, u32>,
    receipt_delay: u32,
    pending_lag: u64,
    offline: bool,
    reject_next: Option<String>,
    revert_next: bool,
    submitted: Vec<DecodedTransaction>,
    estimate_requests: Vec<CallRequest>,
    host: Option<Box<dyn ContractHost>>,
}

pub struct MockChain {
    chain_id: u64,
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(MockState {
                next_nonce: HashMap::new(),
                gas_price: U256::ZERO,
                estimate: None,
                balance: U256::from(u64::MAX),
                block_number: 0,
                receipts: HashMap::new(),
                receipt_polls: HashMap::new(),
                receipt_delay: 0,
                pending_lag: 0,
                offline: false,
                reject_next: None,
                revert_next: false,
                submitted: Vec::new(),
                estimate_requests: Vec::new(),
                host: None,
            }),
        }
    }

    pub fn with_gas_price(self, price: u64) -> Self {
        self.state.lock().gas_price = U256::from(price);
        self
    }

    /// `None` makes `eth_estimateGas` fail.
    pub fn with_estimate(self, estimate: Option<u64>) -> Self {
        self.state.lock().estimate = estimate;
        self
    }

    pub fn with_host(self, host: impl ContractHost + 'static) -> Self {
        self.state.lock().host = Some(Box::new(host));
        self
    }

    /// Pending count lags the real next nonce by `lag`, like a node that has
    /// not yet indexed in-flight transactions.
    pub fn with_pending_lag(self, lag: u64) -> Self {
        self.state.lock().pending_lag = lag;
        self
    }

    /// Receipts become visible only after `polls` empty answers.
    pub fn with_receipt_delay(self, polls: u32) -> Self {
        self.state.lock().receipt_delay = polls;
        self
    }

    pub fn with_nonce(self, address: Address, nonce: u64) -> Self {
        self.state.lock().next_nonce.insert(address, nonce);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// The next raw transaction is refused with `message`.
    pub fn reject_next(&self, message: &str) {
        self.state.lock().reject_next = Some(message.to_string());
    }

    /// The next transaction is mined with `status = false`.
    pub fn revert_next(&self) {
        self.state.lock().revert_next = true;
    }

    pub fn submitted(&self) -> Vec<DecodedTransaction> {
        self.state.lock().submitted.clone()
    }

    pub fn estimate_requests(&self) -> Vec<CallRequest> {
        self.state.lock().estimate_requests.clone()
    }

    pub fn next_nonce(&self, address: Address) -> u64 {
        self.state
            .lock()
            .next_nonce
            .get(&address)
            .copied()
            .unwrap_or(0)
    }

    fn ensure_online(state: &MockState) -> Result<(), RpcError> {
        if state.offline {
            Err(RpcError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn rejected(message: impl Into<String>) -> RpcError {
        RpcError::Rpc {
            code: -32000,
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, RpcError> {
        Self::ensure_online(&self.state.lock())?;
        Ok(self.chain_id)
    }

    async fn is_listening(&self) -> Result<bool, RpcError> {
        Self::ensure_online(&self.state.lock())?;
        Ok(true)
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        let state = self.state.lock();
        Self::ensure_online(&state)?;
        Ok(state.block_number)
    }

    async fn pending_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let state = self.state.lock();
        Self::ensure_online(&state)?;
        let next = state.next_nonce.get(&address).copied().unwrap_or(0);
        Ok(next.saturating_sub(state.pending_lag))
    }

    async fn gas_price(&self) -> Result<U256, RpcError> {
        let state = self.state.lock();
        Self::ensure_online(&state)?;
        Ok(state.gas_price)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError> {
        let mut state = self.state.lock();
        Self::ensure_online(&state)?;
        state.estimate_requests.push(request.clone());
        state
            .estimate
            .ok_or_else(|| Self::rejected("gas required exceeds allowance"))
    }

    async fn balance(&self, _address: Address) -> Result<U256, RpcError> {
        let state = self.state.lock();
        Self::ensure_online(&state)?;
        Ok(state.balance)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, RpcError> {
        let mut state = self.state.lock();
        Self::ensure_online(&state)?;

        let decoded = decode_signed(raw).map_err(|e| Self::rejected(e.to_string()))?;
        if decoded.envelope.chain_id != self.chain_id {
            return Err(Self::rejected("invalid chain id"));
        }
        if let Some(message) = state.reject_next.take() {
            return Err(Self::rejected(message));
        }

        let sender = decoded.sender;
        let expected = state.next_nonce.get(&sender).copied().unwrap_or(0);
        if decoded.envelope.nonce < expected {
            return Err(Self::rejected("nonce too low"));
        }
        if decoded.envelope.nonce > expected {
            return Err(Self::rejected("nonce too high"));
        }

        let revert = std::mem::take(&mut state.revert_next);
        let (status, contract_address) = match decoded.envelope.to {
            None => {
                let address = create_address(sender, decoded.envelope.nonce);
                let ok = !revert
                    && state
                        .host
                        .as_mut()
                        .map_or(true, |h| h.deploy(address, &decoded.envelope.data));
                (ok, Some(address))
            }
            Some(to) => {
                let ok = !revert
                    && state
                        .host
                        .as_mut()
                        .map_or(true, |h| h.transact(to, &decoded.envelope.data));
                (ok, None)
            }
        };

        state.next_nonce.insert(sender, expected + 1);
        state.block_number += 1;
        let block_number = state.block_number;
        let gas_used = (21_000 + 16 * decoded.envelope.data.len() as u64)
            .min(decoded.envelope.gas_limit);

        let receipt = Receipt {
            transaction_hash: decoded.hash,
            block_number,
            block_hash: Hash::from_slice(&Keccak256::digest(block_number.to_be_bytes())),
            gas_used,
            cumulative_gas_used: gas_used,
            status,
            contract_address,
            effective_gas_price: Some(decoded.envelope.gas_price),
        };
        state.receipts.insert(decoded.hash, receipt);
        state.submitted.push(decoded.clone());
        Ok(decoded.hash)
    }

    async fn transaction_receipt(&self, hash: Hash) -> Result<Option<Receipt>, RpcError> {
        let mut state = self.state.lock();
        Self::ensure_online(&state)?;
        let delay = state.receipt_delay;
        let polls = state.receipt_polls.entry(hash).or_insert(0);
        if *polls < delay {
            *polls += 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    async fn call(&self, request: &CallRequest) -> Result<Vec<u8>, RpcError> {
        let state = self.state.lock();
        Self::ensure_online(&state)?;
        let Some(to) = request.to else {
            return Ok(Vec::new());
        };
        match &state.host {
            Some(host) => host.call(to, request.data.as_slice()).map_err(|message| RpcError::Rpc {
                code: -32015,
                message: format!("execution reverted: {}", message),
            }),
            None => Ok(Vec::new()),
        }
    }
}
