//! # Record Store Facade
//!
//! One [`RecordStore`] per entity type, driven by its [`RecordSchema`].
//!
//! ```text
//! list()          getTotalXs ──(0)──► []
//!                     └─► getAllXIds ──► getX(id) × n   failures skipped
//! get(id)         doesXExist ──(false)──► NotFound
//!                     └─► getX(id)
//! metadata(id)    doesXExist ──► getXMetadata(id)
//! store(input)    encode storeX ──► TransactionSubmitter
//! ```
//!
//! Every operation resolves the contract address from the deployment
//! registry first; an absent entry is `NotDeployed`.

use futures::future::join_all;
use rc_01_transaction_pipeline::domain::gas::{RECORD_STORE_GAS_LIMIT, SIMPLE_SET_GAS_LIMIT};
use rc_01_transaction_pipeline::{
    CallRequest, ChainRpc, GasLimitPolicy, TransactionRequest, TransactionSubmitter,
};
use rc_02_record_codec::abi::{encode_call, Token};
use rc_02_record_codec::{
    decode_bool, decode_metadata, decode_record, decode_string_array, decode_uint, encode_getter,
    encode_lookup, encode_store, Record, RecordInput, RecordMetadata,
};
use rc_03_deployment_manager::{Deployment, DeploymentError, DeploymentRegistry};
use shared_types::{address_hex, hash_hex, Address, ContractType, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::StoreError;
use crate::domain::outcome::{Located, RecordList, SetOutcome, StoreOutcome};
use crate::domain::schema::RecordSchema;

/// Chain access shared by every store.
#[derive(Clone)]
pub struct StoreContext {
    pub rpc: Arc<dyn ChainRpc>,
    pub submitter: Arc<dyn TransactionSubmitter>,
    pub registry: Arc<dyn DeploymentRegistry>,
}

impl StoreContext {
    fn deployment(&self, contract_type: ContractType) -> Result<Deployment, StoreError> {
        self.registry
            .load(contract_type)?
            .ok_or(StoreError::Deployment(DeploymentError::NotDeployed(
                contract_type,
            )))
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, StoreError> {
        Ok(self.rpc.call(&CallRequest::call(to, data)).await?)
    }
}

pub struct RecordStore {
    schema: RecordSchema,
    context: StoreContext,
    store_gas: GasLimitPolicy,
}

impl RecordStore {
    pub fn new(schema: RecordSchema, context: StoreContext) -> Self {
        Self {
            schema,
            context,
            store_gas: GasLimitPolicy::Fixed(RECORD_STORE_GAS_LIMIT),
        }
    }

    pub fn with_store_gas(mut self, policy: GasLimitPolicy) -> Self {
        self.store_gas = policy;
        self
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn deployment(&self) -> Result<Deployment, StoreError> {
        self.context.deployment(self.schema.contract_type)
    }

    async fn exists_at(&self, address: Address, record_id: &str) -> Result<bool, StoreError> {
        let data = encode_lookup(&self.schema.exists_method(), record_id);
        Ok(decode_bool(&self.context.call(address, data).await?)?)
    }

    async fn fetch(&self, address: Address, record_id: &str) -> Result<Record, StoreError> {
        let data = encode_lookup(&self.schema.get_method(), record_id);
        Ok(decode_record(&self.context.call(address, data).await?)?)
    }

    fn not_found(&self, record_id: &str) -> StoreError {
        StoreError::NotFound {
            entity: self.schema.entity,
            record_id: record_id.to_string(),
        }
    }

    pub async fn exists(&self, record_id: &str) -> Result<bool, StoreError> {
        let address = self.deployment()?.contract_address;
        self.exists_at(address, record_id).await
    }

    pub async fn get(&self, record_id: &str) -> Result<Located<Record>, StoreError> {
        let address = self.deployment()?.contract_address;
        if !self.exists_at(address, record_id).await? {
            return Err(self.not_found(record_id));
        }
        Ok(Located {
            value: self.fetch(address, record_id).await?,
            contract_address: address,
        })
    }

    pub async fn metadata(&self, record_id: &str) -> Result<Located<RecordMetadata>, StoreError> {
        let address = self.deployment()?.contract_address;
        if !self.exists_at(address, record_id).await? {
            return Err(self.not_found(record_id));
        }
        let data = encode_lookup(&self.schema.metadata_method(), record_id);
        Ok(Located {
            value: decode_metadata(&self.context.call(address, data).await?)?,
            contract_address: address,
        })
    }

    /// Every decodable record. A failing id is logged and skipped, never fatal.
    pub async fn list(&self) -> Result<RecordList, StoreError> {
        let deployment = self.deployment()?;
        let address = deployment.contract_address;

        let total = decode_uint(
            &self
                .context
                .call(address, encode_getter(&self.schema.total_method()))
                .await?,
        )?;
        if total.is_zero() {
            return Ok(RecordList {
                records: Vec::new(),
                skipped: Vec::new(),
                deployment,
            });
        }

        let ids = decode_string_array(
            &self
                .context
                .call(address, encode_getter(&self.schema.ids_method()))
                .await?,
        )?;
        debug!(entity = self.schema.entity, count = ids.len(), "Fetching records");

        let fetched = join_all(ids.iter().map(|id| self.fetch(address, id))).await;
        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = Vec::new();
        for (id, result) in ids.into_iter().zip(fetched) {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(entity = self.schema.entity, record_id = %id, error = %e, "Skipping record");
                    skipped.push(id);
                }
            }
        }

        Ok(RecordList {
            records,
            skipped,
            deployment,
        })
    }

    /// `list()` narrowed to records matching `predicate`.
    pub async fn filter(
        &self,
        predicate: impl Fn(&Record) -> bool,
    ) -> Result<RecordList, StoreError> {
        Ok(self.list().await?.retain(predicate))
    }

    /// Writes `input` through the pipeline. An existing id is overwritten.
    pub async fn store(
        &self,
        input: RecordInput,
        private_key_hex: &str,
    ) -> Result<StoreOutcome, StoreError> {
        if input.record_id.trim().is_empty() {
            return Err(StoreError::MissingRecordId(self.schema.body_key()));
        }
        let address = self.deployment()?.contract_address;
        let record = Record::from_input(input)?;
        let data = encode_store(&self.schema.store_method(), &record);

        info!(entity = self.schema.entity, record_id = %record.record_id, "Storing record");
        let outcome = self
            .context
            .submitter
            .execute(
                private_key_hex,
                TransactionRequest::call(address, data, self.store_gas),
            )
            .await?;
        info!(
            entity = self.schema.entity,
            record_id = %record.record_id,
            tx_hash = %hash_hex(&outcome.receipt.transaction_hash),
            "Record stored"
        );

        Ok(StoreOutcome {
            record_id: record.record_id,
            contract_address: address,
            receipt: outcome.receipt,
        })
    }
}

/// The single-value contract.
pub struct SimpleStore {
    context: StoreContext,
    set_gas: GasLimitPolicy,
}

impl SimpleStore {
    pub fn new(context: StoreContext) -> Self {
        Self {
            context,
            set_gas: GasLimitPolicy::Fixed(SIMPLE_SET_GAS_LIMIT),
        }
    }

    pub fn deployment(&self) -> Result<Deployment, StoreError> {
        self.context.deployment(ContractType::Simple)
    }

    pub async fn get(&self) -> Result<Located<U256>, StoreError> {
        let address = self.deployment()?.contract_address;
        let data = self.context.call(address, encode_getter("get")).await?;
        Ok(Located {
            value: decode_uint(&data)?,
            contract_address: address,
        })
    }

    pub async fn set(&self, value: U256, private_key_hex: &str) -> Result<SetOutcome, StoreError> {
        let address = self.deployment()?.contract_address;
        let data = encode_call("set(uint256)", &[Token::Uint(value)]);

        info!(value = %value.to_dec_string(), contract = %address_hex(&address), "Setting simple value");
        let outcome = self
            .context
            .submitter
            .execute(
                private_key_hex,
                TransactionRequest::call(address, data, self.set_gas),
            )
            .await?;

        Ok(SetOutcome {
            value,
            contract_address: address,
            receipt: outcome.receipt,
        })
    }
}

/// Every store, keyed by contract type.
pub struct RecordStores {
    records: HashMap<ContractType, Arc<RecordStore>>,
    simple: Arc<SimpleStore>,
}

impl RecordStores {
    pub fn new(context: StoreContext) -> Self {
        let records = RecordSchema::all()
            .iter()
            .map(|schema| {
                (
                    schema.contract_type,
                    Arc::new(RecordStore::new(*schema, context.clone())),
                )
            })
            .collect();
        Self {
            records,
            simple: Arc::new(SimpleStore::new(context)),
        }
    }

    /// `None` for [`ContractType::Simple`].
    pub fn get(&self, contract_type: ContractType) -> Option<Arc<RecordStore>> {
        self.records.get(&contract_type).cloned()
    }

    pub fn simple(&self) -> Arc<SimpleStore> {
        Arc::clone(&self.simple)
    }
}
