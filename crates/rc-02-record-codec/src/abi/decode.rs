//! ABI decoding of contract return data.
//!
//! Every offset and length read from the data is bounds-checked before use,
//! so truncated or hostile return data yields [`CodecError::DecodeError`]
//! instead of a panic or an oversized allocation.

use shared_types::{Address, U256};

use super::types::{ParamType, Token};
use crate::domain::errors::CodecError;

const WORD: usize = 32;

/// Decodes `data` as a tuple whose members have the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, CodecError> {
    decode_tuple(types, data, 0)
}

/// Decodes a single return value.
pub fn decode_single(ty: &ParamType, data: &[u8]) -> Result<Token, CodecError> {
    decode(std::slice::from_ref(ty), data)?
        .pop()
        .ok_or_else(|| CodecError::DecodeError("empty result".into()))
}

fn decode_tuple(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, CodecError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut head = base;
    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, head)?;
            let target = base
                .checked_add(offset)
                .ok_or_else(|| CodecError::DecodeError("offset overflow".into()))?;
            tokens.push(decode_at(ty, data, target)?);
            head += WORD;
        } else {
            tokens.push(decode_at(ty, data, head)?);
            head += ty.head_size();
        }
    }
    Ok(tokens)
}

fn decode_at(ty: &ParamType, data: &[u8], pos: usize) -> Result<Token, CodecError> {
    match ty {
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_be_bytes(word(data, pos)?))),
        ParamType::Int(_) => Ok(Token::Int(U256::from_be_bytes(word(data, pos)?))),
        ParamType::Bool => {
            let w = word(data, pos)?;
            match (w[..WORD - 1].iter().all(|b| *b == 0), w[WORD - 1]) {
                (true, 0) => Ok(Token::Bool(false)),
                (true, 1) => Ok(Token::Bool(true)),
                _ => Err(CodecError::DecodeError("invalid bool word".into())),
            }
        }
        ParamType::Address => {
            let w = word(data, pos)?;
            Ok(Token::Address(Address::from_slice(&w[12..])))
        }
        ParamType::FixedBytes(len) => {
            let w = word(data, pos)?;
            Ok(Token::FixedBytes(w[..*len].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(read_bytes(data, pos)?.to_vec())),
        ParamType::String => {
            let bytes = read_bytes(data, pos)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|_| CodecError::DecodeError("string is not valid UTF-8".into()))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, pos)?;
            let start = pos + WORD;
            // Each element needs at least one head word.
            let min = len
                .checked_mul(inner.head_size())
                .and_then(|n| n.checked_add(start))
                .ok_or_else(|| CodecError::DecodeError("array length overflow".into()))?;
            if min > data.len() {
                return Err(CodecError::short(min, data.len()));
            }
            let types = vec![(**inner).clone(); len];
            decode_tuple(&types, data, start).map(Token::Array)
        }
        ParamType::Tuple(members) => decode_tuple(members, data, pos).map(Token::Tuple),
    }
}

fn word(data: &[u8], pos: usize) -> Result<&[u8], CodecError> {
    let end = pos
        .checked_add(WORD)
        .ok_or_else(|| CodecError::DecodeError("position overflow".into()))?;
    data.get(pos..end).ok_or_else(|| CodecError::short(end, data.len()))
}

/// Reads a word that must fit an offset or a length inside `data`.
pub(crate) fn read_usize(data: &[u8], pos: usize) -> Result<usize, CodecError> {
    let w = word(data, pos)?;
    if w[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(CodecError::DecodeError("offset or length out of range".into()));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&w[WORD - 8..]);
    let value = u64::from_be_bytes(buf);
    usize::try_from(value)
        .ok()
        .filter(|v| *v <= data.len())
        .ok_or_else(|| CodecError::DecodeError(format!("offset or length {} out of range", value)))
}

fn read_bytes(data: &[u8], pos: usize) -> Result<&[u8], CodecError> {
    let len = read_usize(data, pos)?;
    let start = pos + WORD;
    let end = start
        .checked_add(len)
        .ok_or_else(|| CodecError::DecodeError("length overflow".into()))?;
    data.get(start..end).ok_or_else(|| CodecError::short(end, data.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::encode;
    use proptest::prelude::*;

    fn word_of(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes().to_vec()
    }

    #[test]
    fn test_decode_uint_and_bool() {
        let mut data = word_of(123);
        data.extend(word_of(1));
        let tokens = decode(&[ParamType::Uint(256), ParamType::Bool], &data).unwrap();
        assert_eq!(
            tokens,
            vec![Token::Uint(U256::from(123u64)), Token::Bool(true)]
        );
    }

    #[test]
    fn test_bool_rejects_other_values() {
        let err = decode_single(&ParamType::Bool, &word_of(2)).unwrap_err();
        assert!(matches!(err, CodecError::DecodeError(_)));
    }

    #[test]
    fn test_short_data_is_an_error() {
        assert!(decode_single(&ParamType::Uint(256), &[0u8; 31]).is_err());
        assert!(decode_single(&ParamType::String, &[]).is_err());
    }

    #[test]
    fn test_hostile_length_is_rejected() {
        let mut data = word_of(0x20);
        data.extend(U256::from(u64::MAX).to_be_bytes());
        assert!(decode_single(&ParamType::String, &data).is_err());
        let array = ParamType::Array(Box::new(ParamType::String));
        assert!(decode_single(&array, &data).is_err());
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut data = word_of(0x20);
        data.extend(word_of(2));
        let mut body = vec![0xff, 0xfe];
        body.resize(32, 0);
        data.extend(body);
        assert!(decode_single(&ParamType::String, &data).is_err());
    }

    #[test]
    fn test_decodes_encoder_output_for_record_layout() {
        let types = [
            ParamType::String,
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::String,
            ParamType::String,
        ];
        let tokens = vec![
            Token::String("emp-001".into()),
            Token::Uint(U256::from(1_704_067_200u64)),
            Token::Uint(U256::from(1_704_067_260u64)),
            Token::String("admin".into()),
            Token::String(r#"{"name":"Alice"}"#.into()),
        ];
        assert_eq!(decode(&types, &encode(&tokens)).unwrap(), tokens);
    }

    #[test]
    fn test_nested_dynamic_tuple() {
        let ty = ParamType::Tuple(vec![ParamType::String, ParamType::Bool]);
        let token = Token::Tuple(vec![Token::String("x".into()), Token::Bool(false)]);
        let data = encode(std::slice::from_ref(&token));
        assert_eq!(data[31], 0x20);
        assert_eq!(decode_single(&ty, &data).unwrap(), token);
    }

    proptest! {
        #[test]
        fn prop_string_arrays_survive(items in proptest::collection::vec(".{0,40}", 0..6)) {
            let token = Token::Array(items.iter().cloned().map(Token::String).collect());
            let ty = ParamType::Array(Box::new(ParamType::String));
            let data = encode(std::slice::from_ref(&token));
            prop_assert_eq!(decode_single(&ty, &data).unwrap(), token);
        }

        #[test]
        fn prop_random_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let ty = ParamType::Tuple(vec![
                ParamType::String,
                ParamType::Uint(256),
                ParamType::Array(Box::new(ParamType::String)),
            ]);
            let _ = decode(&[ty], &data);
        }
    }
}
