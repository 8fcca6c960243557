//! Values returned by the stores.

use rc_01_transaction_pipeline::Receipt;
use rc_02_record_codec::Record;
use rc_03_deployment_manager::Deployment;
use shared_types::{Address, U256};

/// A value read from the contract at `contract_address`.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub value: T,
    pub contract_address: Address,
}

/// Outcome of `list()` and every filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordList {
    pub records: Vec<Record>,
    /// Ids whose fetch or decode failed; their records are omitted.
    pub skipped: Vec<String>,
    pub deployment: Deployment,
}

impl RecordList {
    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn contract_address(&self) -> Address {
        self.deployment.contract_address
    }

    /// Keeps only records matching `predicate`.
    pub fn retain(mut self, predicate: impl Fn(&Record) -> bool) -> Self {
        self.records.retain(|record| predicate(record));
        self
    }
}

/// A mined record write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOutcome {
    pub record_id: String,
    pub contract_address: Address,
    pub receipt: Receipt,
}

/// A mined simple-value write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    pub value: U256,
    pub contract_address: Address,
    pub receipt: Receipt,
}
