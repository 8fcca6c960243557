//! # In-Memory Storage Contract
//!
//! [`StorageContractHost`] plugs into `MockChain` and behaves like every
//! storage contract at once: each deployed address answers the simple
//! `get()`/`set(uint256)` pair and the full method set of all five record
//! schemas. Handles are cheap clones sharing one state, so a test can keep
//! one after moving another into the chain.

use parking_lot::Mutex;
use rc_01_transaction_pipeline::test_utils::ContractHost;
use rc_02_record_codec::abi::{decode_single, encode, selector, ParamType, Token};
use rc_02_record_codec::{
    decode_store_args, encode_metadata, encode_record, encode_record_wrapped, Record,
};
use shared_types::{Address, U256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::schema::RecordSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Store,
    Get,
    Metadata,
    Exists,
    Total,
    Ids,
    SimpleGet,
    SimpleSet,
}

#[derive(Default)]
struct ContractState {
    value: U256,
    records: HashMap<String, Record>,
    ids: Vec<String>,
}

#[derive(Default)]
struct HostState {
    contracts: HashMap<Address, ContractState>,
    wrapped: bool,
    broken: HashSet<String>,
}

#[derive(Clone)]
pub struct StorageContractHost {
    methods: Arc<HashMap<[u8; 4], Method>>,
    state: Arc<Mutex<HostState>>,
}

impl Default for StorageContractHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageContractHost {
    pub fn new() -> Self {
        let mut methods = HashMap::new();
        for schema in RecordSchema::all() {
            let entries = [
                (
                    format!("{}(string,uint256,uint256,string,string)", schema.store_method()),
                    Method::Store,
                ),
                (format!("{}(string)", schema.get_method()), Method::Get),
                (format!("{}(string)", schema.metadata_method()), Method::Metadata),
                (format!("{}(string)", schema.exists_method()), Method::Exists),
                (format!("{}()", schema.total_method()), Method::Total),
                (format!("{}()", schema.ids_method()), Method::Ids),
            ];
            for (signature, method) in entries {
                methods.insert(selector(&signature), method);
            }
        }
        methods.insert(selector("get()"), Method::SimpleGet);
        methods.insert(selector("set(uint256)"), Method::SimpleSet);
        Self {
            methods: Arc::new(methods),
            state: Arc::new(Mutex::new(HostState::default())),
        }
    }

    /// Getters return the struct-wrapped tuple layout instead of the flat one.
    pub fn set_wrapped(&self, wrapped: bool) {
        self.state.lock().wrapped = wrapped;
    }

    /// `getX(id)` returns undecodable bytes from now on.
    pub fn break_record(&self, record_id: &str) {
        self.state.lock().broken.insert(record_id.to_string());
    }

    pub fn stored(&self, address: Address, record_id: &str) -> Option<Record> {
        self.state
            .lock()
            .contracts
            .get(&address)
            .and_then(|c| c.records.get(record_id).cloned())
    }

    fn method(&self, data: &[u8]) -> Option<Method> {
        let head: [u8; 4] = data.get(..4)?.try_into().ok()?;
        self.methods.get(&head).copied()
    }

    fn record_id(data: &[u8]) -> Result<String, String> {
        decode_single(&ParamType::String, &data[4..])
            .ok()
            .and_then(Token::into_string)
            .ok_or_else(|| "bad record id argument".to_string())
    }
}

impl ContractHost for StorageContractHost {
    fn deploy(&mut self, address: Address, init_code: &[u8]) -> bool {
        // A trailing constructor word, if any, seeds the simple value.
        let value = if init_code.len() >= 34 {
            U256::from_be_bytes(&init_code[init_code.len() - 32..])
        } else {
            U256::ZERO
        };
        self.state.lock().contracts.insert(
            address,
            ContractState {
                value,
                ..ContractState::default()
            },
        );
        true
    }

    fn transact(&mut self, to: Address, data: &[u8]) -> bool {
        let method = self.method(data);
        let mut state = self.state.lock();
        let Some(contract) = state.contracts.get_mut(&to) else {
            return true;
        };
        match method {
            Some(Method::Store) => match decode_store_args(&data[4..]) {
                Ok(mut record) if !record.record_id.is_empty() => {
                    if let Some(previous) = contract.records.get(&record.record_id) {
                        record.created_timestamp = previous.created_timestamp;
                    } else {
                        contract.ids.push(record.record_id.clone());
                    }
                    contract.records.insert(record.record_id.clone(), record);
                    true
                }
                _ => false,
            },
            Some(Method::SimpleSet) => match decode_single(&ParamType::Uint(256), &data[4..]) {
                Ok(Token::Uint(value)) => {
                    contract.value = value;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, String> {
        let state = self.state.lock();
        let Some(contract) = state.contracts.get(&to) else {
            return Ok(Vec::new());
        };
        let method = self.method(data).ok_or("unknown selector")?;
        match method {
            Method::SimpleGet => Ok(encode(&[Token::Uint(contract.value)])),
            Method::Total => Ok(encode(&[Token::Uint(U256::from(contract.ids.len() as u64))])),
            Method::Ids => Ok(encode(&[Token::Array(
                contract.ids.iter().cloned().map(Token::String).collect(),
            )])),
            Method::Exists => {
                let id = Self::record_id(data)?;
                Ok(encode(&[Token::Bool(contract.records.contains_key(&id))]))
            }
            Method::Get => {
                let id = Self::record_id(data)?;
                if state.broken.contains(&id) {
                    return Ok(vec![0xff; 7]);
                }
                let record = contract.records.get(&id).ok_or("record does not exist")?;
                Ok(if state.wrapped {
                    encode_record_wrapped(record)
                } else {
                    encode_record(record)
                })
            }
            Method::Metadata => {
                let id = Self::record_id(data)?;
                let record = contract.records.get(&id).ok_or("record does not exist")?;
                Ok(encode_metadata(&record.metadata()))
            }
            Method::Store | Method::SimpleSet => Err("not a view function".into()),
        }
    }
}
