//! Head/tail ABI encoding.
//!
//! Static values sit in the head in place. Dynamic values put a 32-byte
//! offset in the head (relative to the start of the enclosing tuple) and
//! their payload in the tail.

use sha3::{Digest, Keccak256};

use super::types::Token;

const WORD: usize = 32;

/// `keccak256(signature)[..4]`
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Selector followed by the encoded arguments.
pub fn encode_call(signature: &str, args: &[Token]) -> Vec<u8> {
    let mut out = selector(signature).to_vec();
    out.extend(encode(args));
    out
}

/// Encodes `tokens` as the members of one tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens
        .iter()
        .map(|t| if t.is_dynamic() { WORD } else { encode_token(t).len() })
        .sum();

    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();
    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }
    head.extend(tail);
    head
}

fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Uint(value) | Token::Int(value) => value.to_be_bytes().to_vec(),
        Token::Bool(flag) => usize_word(usize::from(*flag)).to_vec(),
        Token::Address(address) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(address.as_bytes());
            word.to_vec()
        }
        Token::FixedBytes(bytes) => {
            let mut word = [0u8; WORD];
            let len = bytes.len().min(WORD);
            word[..len].copy_from_slice(&bytes[..len]);
            word.to_vec()
        }
        Token::String(s) => encode_bytes(s.as_bytes()),
        Token::Bytes(bytes) => encode_bytes(bytes),
        Token::Array(items) => {
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode(items));
            out
        }
        Token::Tuple(items) => encode(items),
    }
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len()).to_vec();
    out.extend(pad_right(bytes));
    out
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded, 0);
    out
}

pub(crate) fn usize_word(value: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&(value as u64).to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, U256};

    #[test]
    fn test_known_selectors() {
        assert_eq!(selector("set(uint256)"), [0x60, 0xfe, 0x47, 0xb1]);
        assert_eq!(selector("get()"), [0x6d, 0x4c, 0xe6, 0x3c]);
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_static_call_layout() {
        let data = encode_call("set(uint256)", &[Token::Uint(U256::from(42u64))]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], &[0x60, 0xfe, 0x47, 0xb1]);
        assert_eq!(data[35], 42);
    }

    #[test]
    fn test_address_is_left_padded() {
        let encoded = encode(&[Token::Address(Address::repeat_byte(0xab))]);
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], &[0xab; 20]);
    }

    #[test]
    fn test_dynamic_offsets_and_padding() {
        let encoded = encode(&[
            Token::String("emp-1".into()),
            Token::Uint(U256::from(7u64)),
            Token::String("x".repeat(33)),
        ]);
        // head: offset, 7, offset
        assert_eq!(encoded[31], 0x60);
        assert_eq!(encoded[63], 7);
        // first string: len word + one padded word => second at 0x60 + 0x40
        assert_eq!(encoded[95], 0xa0);
        assert_eq!(encoded[96 + 31], 5);
        assert_eq!(&encoded[128..133], b"emp-1");
        // 33 bytes pad to 64
        assert_eq!(encoded.len(), 96 + 64 + 32 + 64);
    }

    #[test]
    fn test_empty_string_is_length_word_only() {
        let encoded = encode(&[Token::String(String::new())]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 0x20);
        assert!(encoded[32..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_string_array() {
        let encoded = encode(&[Token::Array(vec![
            Token::String("a".into()),
            Token::String("b".into()),
        ])]);
        // offset, length 2, two element offsets, two (len, data) pairs
        assert_eq!(encoded.len(), 32 * 8);
        assert_eq!(encoded[63], 2);
        assert_eq!(encoded[95], 0x40);
        assert_eq!(encoded[127], 0x80);
    }
}
