//! # Deployment Record
//!
//! Persisted once per contract type. Field names and shapes are those of the
//! `contract-deployment-<type>.json` files, so files written by earlier
//! tooling load unchanged.

use chrono::{DateTime, Utc};
use rc_01_transaction_pipeline::ExecutionOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Address, ContractType, Hash, U256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    #[serde(default = "yes")]
    pub success: bool,
    pub contract_type: ContractType,
    #[serde(default)]
    pub contract_name: String,
    pub contract_address: Address,
    pub transaction_hash: Hash,
    #[serde(default)]
    pub block_number: u64,
    #[serde(default)]
    pub block_hash: Hash,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub gas_limit: u64,
    #[serde(default, with = "decimal")]
    pub gas_price: U256,
    #[serde(default)]
    pub deployer_address: Address,
    #[serde(default)]
    pub deployment_time: DateTime<Utc>,
    #[serde(default)]
    pub constructor_args: Vec<Value>,
    #[serde(default)]
    pub transaction_details: TransactionDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub cumulative_gas_used: u64,
    #[serde(default, with = "optional_decimal")]
    pub effective_gas_price: Option<U256>,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub chain_id: u64,
}

fn yes() -> bool {
    true
}

impl Deployment {
    /// Describes a successful creation transaction.
    pub fn from_outcome(
        contract_type: ContractType,
        contract_address: Address,
        constructor_args: Vec<Value>,
        outcome: &ExecutionOutcome,
        deployment_time: DateTime<Utc>,
    ) -> Self {
        let receipt = &outcome.receipt;
        Self {
            success: true,
            contract_type,
            contract_name: contract_type.contract_name().to_string(),
            contract_address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            block_hash: receipt.block_hash,
            gas_used: receipt.gas_used,
            gas_limit: outcome.gas_limit,
            gas_price: outcome.gas_price,
            deployer_address: outcome.sender,
            deployment_time,
            constructor_args,
            transaction_details: TransactionDetails {
                nonce: outcome.nonce,
                cumulative_gas_used: receipt.cumulative_gas_used,
                effective_gas_price: receipt.effective_gas_price,
                status: receipt.status,
                chain_id: outcome.chain_id,
            },
        }
    }
}

/// Wei amounts as decimal strings; accepts hex, decimal or a JSON number.
mod decimal {
    use serde::{Deserialize, Deserializer, Serializer};
    use shared_types::U256;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_dec_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        U256::deserialize(deserializer)
    }
}

mod optional_decimal {
    use serde::{Deserialize, Deserializer, Serializer};
    use shared_types::U256;

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&value.to_dec_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        Option::<U256>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_file_loads() {
        let legacy = json!({
            "success": true,
            "contractType": "simple",
            "contractName": "SimpleStorage",
            "contractAddress": "0x42699a7612a82f1d9c36148af9c77354759b210b",
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "blockNumber": 12,
            "gasUsed": 120000,
            "gasLimit": 5000000,
            "gasPrice": "1000000000",
            "deploymentTime": "2024-01-01T00:00:00.000Z",
            "constructorArgs": [123],
            "transactionDetails": {"nonce": 0, "status": true, "chainId": 1337, "effectiveGasPrice": 1000000000u64}
        });
        let deployment: Deployment = serde_json::from_value(legacy).unwrap();
        assert_eq!(deployment.contract_type, ContractType::Simple);
        assert_eq!(deployment.gas_price, U256::from(1_000_000_000u64));
        assert_eq!(
            deployment.transaction_details.effective_gas_price,
            Some(U256::from(1_000_000_000u64))
        );
        assert_eq!(deployment.block_number, 12);
    }

    #[test]
    fn test_minimal_file_loads() {
        let deployment: Deployment = serde_json::from_value(json!({
            "contractType": "user",
            "contractAddress": "0x42699a7612a82f1d9c36148af9c77354759b210b",
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001"
        }))
        .unwrap();
        assert!(deployment.success);
        assert_eq!(deployment.gas_price, U256::ZERO);
    }

    #[test]
    fn test_amounts_serialize_as_decimal() {
        let deployment: Deployment = serde_json::from_value(json!({
            "contractType": "task",
            "contractAddress": "0x42699a7612a82f1d9c36148af9c77354759b210b",
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "gasPrice": "0x3b9aca00"
        }))
        .unwrap();
        let value = serde_json::to_value(&deployment).unwrap();
        assert_eq!(value["gasPrice"], "1000000000");
        assert_eq!(value["contractType"], "task");
        assert_eq!(value["transactionDetails"]["effectiveGasPrice"], Value::Null);
    }
}
