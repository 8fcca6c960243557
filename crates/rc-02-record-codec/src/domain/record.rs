//! # Generic Record
//!
//! Every record contract stores the same five fields:
//!
//! | Field | ABI type | Notes |
//! |---|---|---|
//! | `recordId` | `string` | unique per contract |
//! | `createdTimestamp` | `uint256` | Unix seconds, kept across overwrites |
//! | `modifiedTimestamp` | `uint256` | Unix seconds |
//! | `modifiedBy` | `string` | |
//! | `allData` | `string` | entity fields as a JSON document |
//!
//! Getters may return the fields as a flat tuple or wrapped in a single
//! struct; both layouts decode to the same [`Record`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use shared_types::U256;

use super::errors::CodecError;
use super::timestamp::{serialize_iso, TimestampInput};
use crate::abi::{decode, decode_single, encode_call, ParamType, Token};

/// Offset word that marks a struct-wrapped return value.
const WRAPPED_OFFSET: u64 = 0x20;

/// Decoded `allData`. A payload that is not valid JSON is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Json(Value),
    Raw(String),
}

impl RecordPayload {
    /// Interprets the string held by the contract.
    pub fn from_chain(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => RecordPayload::Json(value),
            Err(_) => RecordPayload::Raw(text),
        }
    }

    /// Caller strings are stored verbatim; any other JSON is serialized.
    pub fn from_input(value: Value) -> Self {
        match value {
            Value::String(text) => RecordPayload::Raw(text),
            other => RecordPayload::Json(other),
        }
    }

    /// The exact string written to the contract.
    pub fn to_chain_string(&self) -> String {
        match self {
            RecordPayload::Json(value) => value.to_string(),
            RecordPayload::Raw(text) => text.clone(),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, RecordPayload::Raw(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RecordPayload::Json(value) => Some(value),
            RecordPayload::Raw(_) => None,
        }
    }

    /// Top-level field of a JSON object payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(key))
    }
}

impl Serialize for RecordPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordPayload::Json(value) => value.serialize(serializer),
            RecordPayload::Raw(text) => serializer.serialize_str(text),
        }
    }
}

/// Record as supplied by a caller, before timestamp normalization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    /// A numeric id is stored as its decimal text.
    #[serde(default, deserialize_with = "deserialize_record_id")]
    pub record_id: String,
    #[serde(default)]
    pub created_timestamp: Option<TimestampInput>,
    #[serde(default)]
    pub modified_timestamp: Option<TimestampInput>,
    #[serde(default)]
    pub modified_by: String,
    #[serde(default)]
    pub all_data: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordIdInput {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_record_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RecordIdInput::deserialize(deserializer)? {
        RecordIdInput::Text(text) => text,
        RecordIdInput::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record_id: String,
    #[serde(serialize_with = "serialize_iso")]
    pub created_timestamp: u64,
    #[serde(serialize_with = "serialize_iso")]
    pub modified_timestamp: u64,
    pub modified_by: String,
    pub all_data: RecordPayload,
}

/// A record without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    pub record_id: String,
    #[serde(serialize_with = "serialize_iso")]
    pub created_timestamp: u64,
    #[serde(serialize_with = "serialize_iso")]
    pub modified_timestamp: u64,
    pub modified_by: String,
}

impl Record {
    /// Normalizes caller input. Both timestamps are required.
    pub fn from_input(input: RecordInput) -> Result<Self, CodecError> {
        let required = |ts: Option<TimestampInput>, name: &str| -> Result<u64, CodecError> {
            ts.ok_or_else(|| CodecError::InvalidTimestamp(format!("{} is required", name)))?
                .to_unix_seconds()
        };
        Ok(Self {
            created_timestamp: required(input.created_timestamp, "createdTimestamp")?,
            modified_timestamp: required(input.modified_timestamp, "modifiedTimestamp")?,
            record_id: input.record_id,
            modified_by: input.modified_by,
            all_data: RecordPayload::from_input(input.all_data),
        })
    }

    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            record_id: self.record_id.clone(),
            created_timestamp: self.created_timestamp,
            modified_timestamp: self.modified_timestamp,
            modified_by: self.modified_by.clone(),
        }
    }
}

fn record_types() -> Vec<ParamType> {
    vec![
        ParamType::String,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::String,
        ParamType::String,
    ]
}

fn metadata_types() -> Vec<ParamType> {
    vec![
        ParamType::String,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::String,
    ]
}

/// `<method>(string,uint256,uint256,string,string)` calldata.
pub fn encode_store(method: &str, record: &Record) -> Vec<u8> {
    let signature = format!("{}(string,uint256,uint256,string,string)", method);
    encode_call(
        &signature,
        &[
            Token::String(record.record_id.clone()),
            Token::Uint(U256::from(record.created_timestamp)),
            Token::Uint(U256::from(record.modified_timestamp)),
            Token::String(record.modified_by.clone()),
            Token::String(record.all_data.to_chain_string()),
        ],
    )
}

/// `<method>(string)` calldata for id-keyed lookups.
pub fn encode_lookup(method: &str, record_id: &str) -> Vec<u8> {
    encode_call(
        &format!("{}(string)", method),
        &[Token::String(record_id.to_string())],
    )
}

/// `<method>()` calldata.
pub fn encode_getter(method: &str) -> Vec<u8> {
    encode_call(&format!("{}()", method), &[])
}

/// Decodes a tuple that may or may not be wrapped in a struct.
fn decode_fields(members: Vec<ParamType>, data: &[u8]) -> Result<Vec<Token>, CodecError> {
    let first = data
        .get(..32)
        .ok_or_else(|| CodecError::short(32, data.len()))?;
    if U256::from_be_bytes(first) == U256::from(WRAPPED_OFFSET) {
        decode_single(&ParamType::Tuple(members), data)?
            .into_tuple()
            .ok_or_else(|| CodecError::DecodeError("expected tuple".into()))
    } else {
        decode(&members, data)
    }
}

fn take_string(tokens: &mut impl Iterator<Item = Token>, field: &str) -> Result<String, CodecError> {
    tokens
        .next()
        .and_then(Token::into_string)
        .ok_or_else(|| CodecError::DecodeError(format!("{} is not a string", field)))
}

fn take_seconds(tokens: &mut impl Iterator<Item = Token>, field: &str) -> Result<u64, CodecError> {
    let value = tokens
        .next()
        .and_then(Token::into_uint)
        .ok_or_else(|| CodecError::DecodeError(format!("{} is not a uint", field)))?;
    u64::try_from(value.into_inner())
        .map_err(|_| CodecError::DecodeError(format!("{} exceeds 64 bits", field)))
}

/// Decodes the return data of `getX(string)`.
pub fn decode_record(data: &[u8]) -> Result<Record, CodecError> {
    let mut tokens = decode_fields(record_types(), data)?.into_iter();
    Ok(Record {
        record_id: take_string(&mut tokens, "recordId")?,
        created_timestamp: take_seconds(&mut tokens, "createdTimestamp")?,
        modified_timestamp: take_seconds(&mut tokens, "modifiedTimestamp")?,
        modified_by: take_string(&mut tokens, "modifiedBy")?,
        all_data: RecordPayload::from_chain(take_string(&mut tokens, "allData")?),
    })
}

/// Decodes the return data of `getXMetadata(string)`.
pub fn decode_metadata(data: &[u8]) -> Result<RecordMetadata, CodecError> {
    let mut tokens = decode_fields(metadata_types(), data)?.into_iter();
    Ok(RecordMetadata {
        record_id: take_string(&mut tokens, "recordId")?,
        created_timestamp: take_seconds(&mut tokens, "createdTimestamp")?,
        modified_timestamp: take_seconds(&mut tokens, "modifiedTimestamp")?,
        modified_by: take_string(&mut tokens, "modifiedBy")?,
    })
}

pub fn decode_bool(data: &[u8]) -> Result<bool, CodecError> {
    decode_single(&ParamType::Bool, data)?
        .into_bool()
        .ok_or_else(|| CodecError::DecodeError("expected bool".into()))
}

pub fn decode_uint(data: &[u8]) -> Result<U256, CodecError> {
    decode_single(&ParamType::Uint(256), data)?
        .into_uint()
        .ok_or_else(|| CodecError::DecodeError("expected uint256".into()))
}

pub fn decode_string_array(data: &[u8]) -> Result<Vec<String>, CodecError> {
    decode_single(&ParamType::Array(Box::new(ParamType::String)), data)?
        .into_array()
        .ok_or_else(|| CodecError::DecodeError("expected string[]".into()))?
        .into_iter()
        .map(|token| {
            token
                .into_string()
                .ok_or_else(|| CodecError::DecodeError("expected string element".into()))
        })
        .collect()
}

/// Return data a record getter produces for `record`, flat layout.
pub fn encode_record(record: &Record) -> Vec<u8> {
    crate::abi::encode(&record_tokens(record))
}

/// Return data with the fields wrapped in a single struct.
pub fn encode_record_wrapped(record: &Record) -> Vec<u8> {
    crate::abi::encode(&[Token::Tuple(record_tokens(record))])
}

/// Return data a metadata getter produces.
pub fn encode_metadata(metadata: &RecordMetadata) -> Vec<u8> {
    crate::abi::encode(&[
        Token::String(metadata.record_id.clone()),
        Token::Uint(U256::from(metadata.created_timestamp)),
        Token::Uint(U256::from(metadata.modified_timestamp)),
        Token::String(metadata.modified_by.clone()),
    ])
}

fn record_tokens(record: &Record) -> Vec<Token> {
    vec![
        Token::String(record.record_id.clone()),
        Token::Uint(U256::from(record.created_timestamp)),
        Token::Uint(U256::from(record.modified_timestamp)),
        Token::String(record.modified_by.clone()),
        Token::String(record.all_data.to_chain_string()),
    ]
}

/// Decodes `storeX` calldata (selector stripped) back into a record.
pub fn decode_store_args(args: &[u8]) -> Result<Record, CodecError> {
    let mut tokens = decode(&record_types(), args)?.into_iter();
    Ok(Record {
        record_id: take_string(&mut tokens, "recordId")?,
        created_timestamp: take_seconds(&mut tokens, "createdTimestamp")?,
        modified_timestamp: take_seconds(&mut tokens, "modifiedTimestamp")?,
        modified_by: take_string(&mut tokens, "modifiedBy")?,
        all_data: RecordPayload::Raw(take_string(&mut tokens, "allData")?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::selector;
    use serde_json::json;

    fn sample() -> Record {
        Record {
            record_id: "EMP-001".into(),
            created_timestamp: 1_704_067_200,
            modified_timestamp: 1_704_067_200,
            modified_by: "admin".into(),
            all_data: RecordPayload::Json(json!({"name": "Alice", "department": "R&D"})),
        }
    }

    #[test]
    fn test_flat_and_wrapped_layouts_decode_identically() {
        let record = sample();
        let flat = encode_record(&record);
        let wrapped = encode_record_wrapped(&record);
        assert_eq!(flat[31], 0xa0);
        assert_eq!(wrapped[31], 0x20);
        assert_eq!(decode_record(&flat).unwrap(), record);
        assert_eq!(decode_record(&wrapped).unwrap(), record);
    }

    #[test]
    fn test_malformed_payload_is_preserved_raw() {
        let mut record = sample();
        record.all_data = RecordPayload::Raw("{not json".into());
        let decoded = decode_record(&encode_record(&record)).unwrap();
        assert_eq!(decoded.all_data, RecordPayload::Raw("{not json".into()));
        assert!(decoded.all_data.is_raw());
    }

    #[test]
    fn test_string_payload_holding_json_is_parsed_on_read() {
        let payload = RecordPayload::from_input(json!(r#"{"role":"admin"}"#));
        assert_eq!(payload.to_chain_string(), r#"{"role":"admin"}"#);
        let read = RecordPayload::from_chain(payload.to_chain_string());
        assert_eq!(read.field("role"), Some(&json!("admin")));
    }

    #[test]
    fn test_metadata_decodes_both_layouts() {
        let meta = sample().metadata();
        assert_eq!(decode_metadata(&encode_metadata(&meta)).unwrap(), meta);
        let wrapped = crate::abi::encode(&[Token::Tuple(vec![
            Token::String(meta.record_id.clone()),
            Token::Uint(U256::from(meta.created_timestamp)),
            Token::Uint(U256::from(meta.modified_timestamp)),
            Token::String(meta.modified_by.clone()),
        ])]);
        assert_eq!(decode_metadata(&wrapped).unwrap(), meta);
    }

    #[test]
    fn test_store_calldata() {
        let record = sample();
        let data = encode_store("storeEmployee", &record);
        assert_eq!(
            &data[..4],
            &selector("storeEmployee(string,uint256,uint256,string,string)")
        );
        assert_eq!(decode_store_args(&data[4..]).unwrap().record_id, "EMP-001");
    }

    #[test]
    fn test_from_input_normalizes_timestamps() {
        let input: RecordInput = serde_json::from_value(json!({
            "recordId": "EMP-001",
            "createdTimestamp": "2024-01-01T00:00:00.750Z",
            "modifiedTimestamp": 1_704_067_200u64,
            "modifiedBy": "admin",
            "allData": {"name": "Alice"}
        }))
        .unwrap();
        let record = Record::from_input(input).unwrap();
        assert_eq!(record.created_timestamp, 1_704_067_200);
        assert_eq!(record.modified_timestamp, 1_704_067_200);
        assert_eq!(record.all_data.to_chain_string(), r#"{"name":"Alice"}"#);
    }

    #[test]
    fn test_numeric_record_id_is_stored_as_text() {
        let input: RecordInput = serde_json::from_value(json!({
            "recordId": 42,
            "createdTimestamp": 1_704_067_200u64,
            "modifiedTimestamp": 1_704_067_200u64
        }))
        .unwrap();
        assert_eq!(input.record_id, "42");

        let data = encode_store("storeEmployee", &Record::from_input(input).unwrap());
        assert_eq!(decode_store_args(&data[4..]).unwrap().record_id, "42");

        let rejected = serde_json::from_value::<RecordInput>(json!({"recordId": true}));
        assert!(rejected.is_err());
    }

    #[test]
    fn test_missing_or_bad_timestamp_is_rejected() {
        let missing = RecordInput {
            record_id: "x".into(),
            ..RecordInput::default()
        };
        assert!(matches!(
            Record::from_input(missing),
            Err(CodecError::InvalidTimestamp(_))
        ));

        let bad: RecordInput = serde_json::from_value(json!({
            "recordId": "x",
            "createdTimestamp": "not a date",
            "modifiedTimestamp": "2024-01-01"
        }))
        .unwrap();
        assert!(matches!(
            Record::from_input(bad),
            Err(CodecError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_presentation_uses_iso_timestamps() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["createdTimestamp"], "2024-01-01T00:00:00.000Z");
        assert_eq!(value["recordId"], "EMP-001");
        assert_eq!(value["allData"]["name"], "Alice");
    }

    #[test]
    fn test_scalar_and_array_getters() {
        assert!(decode_bool(&crate::abi::encode(&[Token::Bool(true)])).unwrap());
        assert_eq!(
            decode_uint(&crate::abi::encode(&[Token::Uint(U256::from(3u64))])).unwrap(),
            U256::from(3u64)
        );
        let ids = crate::abi::encode(&[Token::Array(vec![
            Token::String("a".into()),
            Token::String("b".into()),
        ])]);
        assert_eq!(decode_string_array(&ids).unwrap(), vec!["a", "b"]);
        assert!(decode_record(&[]).is_err());
    }
}
