//! # Chain Primitives
//!
//! Addresses, hashes and 256-bit quantities as they travel over Ethereum
//! JSON-RPC: `0x`-prefixed hex strings on the wire, fixed-size values in code.

use primitive_types::U256 as PrimitiveU256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use primitive_types::{H160 as Address, H256 as Hash};

use crate::errors::TypeError;

// =============================================================================
// U256
// =============================================================================

/// 256-bit unsigned quantity.
///
/// Serializes as a `0x` hex string. Deserializes from a hex string, a decimal
/// string or a JSON number, which covers both node responses and caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct U256(pub PrimitiveU256);

impl U256 {
    pub const ZERO: U256 = U256(PrimitiveU256::zero());

    /// Parses `0x`-prefixed hex or plain decimal. `"0x"` alone is zero, which is
    /// what some permissioned nodes return for an empty quantity.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let value = value.trim();
        if let Some(hex_str) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
            if hex_str.is_empty() {
                return Ok(Self::ZERO);
            }
            PrimitiveU256::from_str_radix(hex_str, 16)
                .map(U256)
                .map_err(|_| TypeError::InvalidQuantity(value.to_string()))
        } else {
            PrimitiveU256::from_dec_str(value)
                .map(U256)
                .map_err(|_| TypeError::InvalidQuantity(value.to_string()))
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Lossy narrowing used for block numbers and gas figures.
    #[inline]
    pub fn low_u64(&self) -> u64 {
        self.0.low_u64()
    }

    #[inline]
    pub fn into_inner(self) -> PrimitiveU256 {
        self.0
    }

    /// Big-endian 32-byte word, the ABI and RLP representation.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        U256(PrimitiveU256::from_big_endian(bytes))
    }

    /// Decimal rendering, the form contract values are returned in over HTTP.
    pub fn to_dec_string(&self) -> String {
        self.0.to_string()
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        U256(PrimitiveU256::from(v))
    }
}

impl From<u128> for U256 {
    fn from(v: u128) -> Self {
        U256(PrimitiveU256::from(v))
    }
}

impl From<PrimitiveU256> for U256 {
    fn from(v: PrimitiveU256) -> Self {
        U256(v)
    }
}

impl FromStr for U256 {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::parse(s)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{:x}", self.0))
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U256Visitor;

        impl<'de> de::Visitor<'de> for U256Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex string starting with 0x, a decimal string or a number")
            }

            fn visit_str<E>(self, value: &str) -> Result<U256, E>
            where
                E: de::Error,
            {
                U256::parse(value).map_err(de::Error::custom)
            }

            fn visit_u64<E>(self, value: u64) -> Result<U256, E>
            where
                E: de::Error,
            {
                Ok(U256::from(value))
            }

            fn visit_u128<E>(self, value: u128) -> Result<U256, E>
            where
                E: de::Error,
            {
                Ok(U256::from(value))
            }
        }

        deserializer.deserialize_any(U256Visitor)
    }
}

// =============================================================================
// BYTES
// =============================================================================

/// Arbitrary byte payload, hex encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Decodes hex with or without a `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, TypeError> {
        let trimmed = value.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        hex::decode(body)
            .map(Bytes)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Bytes::from_hex(&s).map_err(de::Error::custom)
    }
}

// =============================================================================
// ADDRESS PARSING
// =============================================================================

/// Parses a 20-byte address written as 40 hex characters, `0x` prefix optional.
///
/// Checksum casing is accepted but not verified.
pub fn parse_address(value: &str) -> Result<Address, TypeError> {
    let trimmed = value.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if body.len() != 40 {
        return Err(TypeError::InvalidAddress(value.to_string()));
    }
    let bytes = hex::decode(body).map_err(|_| TypeError::InvalidAddress(value.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// Full lowercase `0x` rendering. `H160`'s `Display` abbreviates the middle.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Full lowercase `0x` rendering of a 32-byte hash.
pub fn hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

// =============================================================================
// QUANTITY (u64) SERDE
// =============================================================================

/// Serde helpers for `u64` JSON-RPC quantities (`"0x1a"`).
///
/// Deserialization also accepts plain JSON numbers and decimal strings.
pub mod quantity {
    use super::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{:x}", value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = U256::deserialize(deserializer)?;
        if value.0 > primitive_types::U256::from(u64::MAX) {
            return Err(serde::de::Error::custom("quantity exceeds u64"));
        }
        Ok(value.low_u64())
    }

    /// Receipt `status` field: `"0x1"` is success, anything else is failure.
    pub mod status {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(if *value { "0x1" } else { "0x0" })
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Flag(bool),
                Quantity(super::U256),
            }

            Ok(match Raw::deserialize(deserializer)? {
                Raw::Flag(flag) => flag,
                Raw::Quantity(q) => !q.is_zero(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_parses_hex_decimal_and_empty() {
        assert_eq!(U256::parse("0x3b9aca00").unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(U256::parse("1000000000").unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(U256::parse("0x").unwrap(), U256::ZERO);
        assert!(U256::parse("0xzz").is_err());
        assert!(U256::parse("abc").is_err());
    }

    #[test]
    fn test_u256_serde() {
        let json = serde_json::to_string(&U256::from(255u64)).unwrap();
        assert_eq!(json, "\"0xff\"");

        let from_number: U256 = serde_json::from_str("123").unwrap();
        assert_eq!(from_number, U256::from(123u64));
        let from_dec: U256 = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(from_dec, U256::from(123u64));
    }

    #[test]
    fn test_u256_be_bytes() {
        let value = U256::from(0x0102u64);
        let bytes = value.to_be_bytes();
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert_eq!(U256::from_be_bytes(&bytes), value);
        assert_eq!(value.to_dec_string(), "258");
    }

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x2c7536E3605D9C16a7a3D7b1898e529396a65c23").unwrap();
        assert_eq!(address_hex(&addr), "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23");
        assert!(parse_address("2c7536e3605d9c16a7a3d7b1898e529396a65c23").is_ok());
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("0xZZ7536e3605d9c16a7a3d7b1898e529396a65c23").is_err());
    }

    #[test]
    fn test_bytes_hex() {
        let bytes = Bytes::from_hex("0x6080").unwrap();
        assert_eq!(bytes.as_slice(), &[0x60, 0x80]);
        assert_eq!(bytes.to_hex(), "0x6080");
        assert_eq!(Bytes::from_hex("6080").unwrap(), bytes);
        assert!(Bytes::from_hex("0x608").is_err());
    }

    #[test]
    fn test_quantity_and_status() {
        #[derive(Serialize, Deserialize)]
        struct Probe {
            #[serde(with = "quantity")]
            n: u64,
            #[serde(with = "quantity::status")]
            ok: bool,
        }

        let probe: Probe = serde_json::from_str(r#"{"n":"0x10","ok":"0x1"}"#).unwrap();
        assert_eq!(probe.n, 16);
        assert!(probe.ok);

        let probe: Probe = serde_json::from_str(r#"{"n":7,"ok":"0x0"}"#).unwrap();
        assert_eq!(probe.n, 7);
        assert!(!probe.ok);

        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["n"], "0x7");
        assert_eq!(json["ok"], "0x0");
    }
}
