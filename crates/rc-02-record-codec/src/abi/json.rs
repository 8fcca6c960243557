//! Coercion of caller-supplied JSON values into ABI tokens.
//!
//! Used for constructor arguments, whose types only become known once the
//! contract artifact's ABI has been read.

use primitive_types::U256 as PrimitiveU256;
use serde_json::Value;
use shared_types::{parse_address, U256};

use super::types::{ParamType, Token};
use crate::domain::errors::CodecError;

/// Coerces `values` to `types` position by position.
pub fn tokenize_all(types: &[ParamType], values: &[Value]) -> Result<Vec<Token>, CodecError> {
    if types.len() != values.len() {
        return Err(CodecError::InvalidArgument(format!(
            "expected {} arguments, got {}",
            types.len(),
            values.len()
        )));
    }
    types
        .iter()
        .zip(values)
        .map(|(ty, value)| tokenize(ty, value))
        .collect()
}

pub fn tokenize(ty: &ParamType, value: &Value) -> Result<Token, CodecError> {
    let mismatch = || CodecError::InvalidArgument(format!("cannot convert {} to {}", value, ty));
    match ty {
        ParamType::Uint(_) => match value {
            Value::Number(n) => n
                .as_u64()
                .map(|v| Token::Uint(U256::from(v)))
                .ok_or_else(mismatch),
            Value::String(s) => Ok(Token::Uint(U256::parse(s)?)),
            _ => Err(mismatch()),
        },
        ParamType::Int(_) => match value {
            Value::Number(n) => n.as_i64().map(|v| Token::Int(signed(v.into()))).ok_or_else(mismatch),
            Value::String(s) => s
                .trim()
                .parse::<i128>()
                .map(|v| Token::Int(signed(v)))
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ParamType::Bool => match value {
            Value::Bool(b) => Ok(Token::Bool(*b)),
            Value::String(s) if s == "true" => Ok(Token::Bool(true)),
            Value::String(s) if s == "false" => Ok(Token::Bool(false)),
            _ => Err(mismatch()),
        },
        ParamType::Address => match value {
            Value::String(s) => Ok(Token::Address(parse_address(s)?)),
            _ => Err(mismatch()),
        },
        ParamType::String => match value {
            Value::String(s) => Ok(Token::String(s.clone())),
            _ => Err(mismatch()),
        },
        ParamType::Bytes => Ok(Token::Bytes(hex_bytes(value).ok_or_else(mismatch)?)),
        ParamType::FixedBytes(len) => {
            let bytes = hex_bytes(value).ok_or_else(mismatch)?;
            if bytes.len() > *len {
                return Err(mismatch());
            }
            Ok(Token::FixedBytes(bytes))
        }
        ParamType::Array(inner) => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| tokenize(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array),
            _ => Err(mismatch()),
        },
        ParamType::Tuple(members) => match value {
            Value::Array(items) => tokenize_all(members, items).map(Token::Tuple),
            _ => Err(mismatch()),
        },
    }
}

fn signed(value: i128) -> U256 {
    let magnitude = PrimitiveU256::from(value.unsigned_abs());
    if value < 0 {
        U256((!magnitude).overflowing_add(PrimitiveU256::one()).0)
    } else {
        U256(magnitude)
    }
}

fn hex_bytes(value: &Value) -> Option<Vec<u8>> {
    let s = value.as_str()?;
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uint_from_number_and_strings() {
        assert_eq!(
            tokenize(&ParamType::Uint(256), &json!(123)).unwrap(),
            Token::Uint(U256::from(123u64))
        );
        assert_eq!(
            tokenize(&ParamType::Uint(256), &json!("0x7b")).unwrap(),
            Token::Uint(U256::from(123u64))
        );
        assert_eq!(
            tokenize(&ParamType::Uint(256), &json!("123")).unwrap(),
            Token::Uint(U256::from(123u64))
        );
        assert!(tokenize(&ParamType::Uint(256), &json!(-1)).is_err());
        assert!(tokenize(&ParamType::Uint(256), &json!(1.5)).is_err());
    }

    #[test]
    fn test_negative_int_is_twos_complement() {
        let Token::Int(value) = tokenize(&ParamType::Int(256), &json!(-1)).unwrap() else {
            panic!("expected int");
        };
        assert_eq!(value.to_be_bytes(), [0xff; 32]);
    }

    #[test]
    fn test_arity_is_checked() {
        let err = tokenize_all(&[ParamType::Uint(256)], &[]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidArgument(_)));
    }

    #[test]
    fn test_type_mismatch_is_invalid_argument() {
        assert!(tokenize(&ParamType::String, &json!(5)).is_err());
        assert!(tokenize(&ParamType::Address, &json!("0x12")).is_err());
        assert!(tokenize(&ParamType::FixedBytes(2), &json!("0x010203")).is_err());
    }

    #[test]
    fn test_nested_values() {
        let ty = ParamType::parse("(string,uint256[])").unwrap();
        let token = tokenize(&ty, &json!(["a", [1, 2]])).unwrap();
        assert_eq!(
            token,
            Token::Tuple(vec![
                Token::String("a".into()),
                Token::Array(vec![
                    Token::Uint(U256::from(1u64)),
                    Token::Uint(U256::from(2u64))
                ]),
            ])
        );
    }
}
