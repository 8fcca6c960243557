//! ABI parameter types and values.

use shared_types::{Address, U256};
use std::fmt;

use crate::domain::errors::CodecError;

/// Solidity parameter type, limited to what the storage contracts and their
/// constructors use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// `uintN`; every width shares the 32-byte encoding.
    Uint(usize),
    /// `intN`, two's complement.
    Int(usize),
    Bool,
    Address,
    String,
    Bytes,
    /// `bytesN`, 1 ≤ N ≤ 32.
    FixedBytes(usize),
    /// `T[]`
    Array(Box<ParamType>),
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Parses a canonical type string such as `uint256`, `string[]` or `bytes32`.
    pub fn parse(value: &str) -> Result<Self, CodecError> {
        let value = value.trim();
        if let Some(inner) = value.strip_suffix("[]") {
            return Ok(ParamType::Array(Box::new(ParamType::parse(inner)?)));
        }
        if let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
            let members = split_tuple(inner)
                .into_iter()
                .map(ParamType::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ParamType::Tuple(members));
        }
        match value {
            "bool" => return Ok(ParamType::Bool),
            "address" => return Ok(ParamType::Address),
            "string" => return Ok(ParamType::String),
            "bytes" => return Ok(ParamType::Bytes),
            "uint" => return Ok(ParamType::Uint(256)),
            "int" => return Ok(ParamType::Int(256)),
            _ => {}
        }
        let sized = |prefix: &str, max: usize| -> Option<usize> {
            value
                .strip_prefix(prefix)
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| *n > 0 && *n <= max)
        };
        if let Some(bits) = sized("uint", 256).filter(|b| b % 8 == 0) {
            return Ok(ParamType::Uint(bits));
        }
        if let Some(bits) = sized("int", 256).filter(|b| b % 8 == 0) {
            return Ok(ParamType::Int(bits));
        }
        if let Some(len) = sized("bytes", 32) {
            return Ok(ParamType::FixedBytes(len));
        }
        Err(CodecError::UnsupportedType(value.to_string()))
    }

    /// Dynamic types are encoded out of line behind an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::String | ParamType::Bytes | ParamType::Array(_) => true,
            ParamType::Tuple(members) => members.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes occupied in the head of an enclosing tuple.
    pub fn head_size(&self) -> usize {
        match self {
            ParamType::Tuple(members) if !self.is_dynamic() => {
                members.iter().map(ParamType::head_size).sum()
            }
            _ => 32,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => f.write_str("bool"),
            ParamType::Address => f.write_str("address"),
            ParamType::String => f.write_str("string"),
            ParamType::Bytes => f.write_str("bytes"),
            ParamType::FixedBytes(len) => write!(f, "bytes{}", len),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::Tuple(members) => {
                let names: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "({})", names.join(","))
            }
        }
    }
}

fn split_tuple(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !inner[start..].trim().is_empty() {
        parts.push(&inner[start..]);
    }
    parts
}

/// An ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Uint(U256),
    /// Two's complement 256-bit representation.
    Int(U256),
    Bool(bool),
    Address(Address),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::String(_) | Token::Bytes(_) | Token::Array(_) => true,
            Token::Tuple(members) => members.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Token::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_strings() {
        assert_eq!(ParamType::parse("uint256").unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("uint8").unwrap(), ParamType::Uint(8));
        assert_eq!(ParamType::parse("int").unwrap(), ParamType::Int(256));
        assert_eq!(ParamType::parse("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(
            ParamType::parse("string[]").unwrap(),
            ParamType::Array(Box::new(ParamType::String))
        );
        assert_eq!(
            ParamType::parse("(string,uint256)").unwrap(),
            ParamType::Tuple(vec![ParamType::String, ParamType::Uint(256)])
        );
        assert!(ParamType::parse("uint7").is_err());
        assert!(ParamType::parse("bytes33").is_err());
        assert!(ParamType::parse("mapping").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for ty in ["uint256", "string[]", "(string,(uint256,bool))", "bytes4", "address"] {
            assert_eq!(ParamType::parse(ty).unwrap().to_string(), ty);
        }
    }

    #[test]
    fn test_dynamic_and_head_size() {
        assert!(ParamType::String.is_dynamic());
        assert!(!ParamType::Uint(256).is_dynamic());
        let static_tuple = ParamType::Tuple(vec![ParamType::Uint(256), ParamType::Bool]);
        assert!(!static_tuple.is_dynamic());
        assert_eq!(static_tuple.head_size(), 64);
        let dynamic_tuple = ParamType::Tuple(vec![ParamType::String]);
        assert_eq!(dynamic_tuple.head_size(), 32);
    }
}
