//! Transaction receipt as returned by `eth_getTransactionReceipt`.

use serde::{Deserialize, Serialize};
use shared_types::{quantity, Address, Hash, U256};

/// Inclusion outcome of a mined transaction.
///
/// `status == false` means the transaction was mined but execution failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: Hash,
    #[serde(with = "quantity")]
    pub block_number: u64,
    pub block_hash: Hash,
    #[serde(with = "quantity")]
    pub gas_used: u64,
    #[serde(with = "quantity")]
    pub cumulative_gas_used: u64,
    #[serde(with = "quantity::status")]
    pub status: bool,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_gas_price: Option<U256>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status
    }
}
