//! # Transaction Envelope
//!
//! EIP-155 legacy transactions, the format permissioned istanbul-era chains
//! accept from every client.
//!
//! ```text
//! signing hash = keccak256(rlp([nonce, gasPrice, gasLimit, to, 0, data, chainId, 0, 0]))
//! wire         = rlp([nonce, gasPrice, gasLimit, to, 0, data, v, r, s])
//! v            = chainId * 2 + 35 + recoveryId
//! ```

use rlp::{Rlp, RlpStream};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash, U256};

use super::account::{address_from_public_key, PrivateKey};
use super::errors::PipelineError;

/// Unsigned transaction. `to == None` is a contract creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEnvelope {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

impl TransactionEnvelope {
    pub fn is_creation(&self) -> bool {
        self.to.is_none()
    }

    fn append_body(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price.into_inner());
        stream.append(&self.gas_limit);
        match &self.to {
            Some(to) => {
                stream.append(to);
            }
            None => {
                stream.append_empty_data();
            }
        }
        // value: the gateway never transfers ether
        stream.append_empty_data();
        stream.append(&self.data);
    }

    /// EIP-155 signing hash.
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&self.chain_id);
        stream.append_empty_data();
        stream.append_empty_data();
        Keccak256::digest(stream.as_raw()).into()
    }

    /// Signs the envelope. Deterministic (RFC 6979) and free of I/O.
    pub fn sign(&self, key: &PrivateKey) -> SignedTransaction {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(self.signing_hash());
        let signature = secp.sign_ecdsa_recoverable(&message, key.secret());
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        let v = self.chain_id * 2 + 35 + recovery_id.to_i32() as u64;

        let mut stream = RlpStream::new_list(9);
        self.append_body(&mut stream);
        stream.append(&v);
        stream.append(&primitive_types::U256::from_big_endian(&r));
        stream.append(&primitive_types::U256::from_big_endian(&s));
        let raw = stream.out().to_vec();
        let hash = Hash::from_slice(&Keccak256::digest(&raw));

        SignedTransaction {
            envelope: self.clone(),
            v,
            r,
            s,
            raw,
            hash,
        }
    }
}

/// Signs with a hex key; see [`PrivateKey::from_hex`] for the accepted format.
pub fn sign(
    envelope: &TransactionEnvelope,
    private_key_hex: &str,
) -> Result<SignedTransaction, PipelineError> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    Ok(envelope.sign(&key))
}

/// A signed envelope and its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub envelope: TransactionEnvelope,
    pub v: u64,
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub raw: Vec<u8>,
    pub hash: Hash,
}

/// A decoded raw transaction and its recovered sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub envelope: TransactionEnvelope,
    pub sender: Address,
    pub hash: Hash,
}

/// Decodes an EIP-155 legacy transaction and recovers its sender.
pub fn decode_signed(raw: &[u8]) -> Result<DecodedTransaction, PipelineError> {
    let rlp = Rlp::new(raw);
    if !rlp.is_list() {
        return Err(PipelineError::MalformedTransaction(
            "transaction must be an RLP list".into(),
        ));
    }
    let count = rlp.item_count().map_err(|e| rlp_error("item count", e))?;
    if count != 9 {
        return Err(PipelineError::MalformedTransaction(format!(
            "legacy transaction must have 9 fields, got {}",
            count
        )));
    }

    let nonce: u64 = rlp.val_at(0).map_err(|e| rlp_error("nonce", e))?;
    let gas_price = U256::from_be_bytes(&fixed_bytes(&rlp, 1, 32)?);
    let gas_limit: u64 = rlp.val_at(2).map_err(|e| rlp_error("gas limit", e))?;
    let to_bytes: Vec<u8> = rlp.val_at(3).map_err(|e| rlp_error("to", e))?;
    let to = match to_bytes.len() {
        0 => None,
        20 => Some(Address::from_slice(&to_bytes)),
        n => {
            return Err(PipelineError::MalformedTransaction(format!(
                "invalid recipient length {}",
                n
            )))
        }
    };
    let data: Vec<u8> = rlp.val_at(5).map_err(|e| rlp_error("data", e))?;
    let v: u64 = rlp.val_at(6).map_err(|e| rlp_error("v", e))?;
    let r = fixed_bytes(&rlp, 7, 32)?;
    let s = fixed_bytes(&rlp, 8, 32)?;

    if v < 35 {
        return Err(PipelineError::MalformedTransaction(format!(
            "transaction is not replay protected (v = {})",
            v
        )));
    }
    let chain_id = (v - 35) / 2;
    let recovery = RecoveryId::from_i32(((v - 35) % 2) as i32)
        .map_err(|e| PipelineError::MalformedTransaction(e.to_string()))?;

    let envelope = TransactionEnvelope {
        nonce,
        gas_price,
        gas_limit,
        to,
        data,
        chain_id,
    };

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&r);
    compact[32..].copy_from_slice(&s);
    let signature = RecoverableSignature::from_compact(&compact, recovery)
        .map_err(|e| PipelineError::MalformedTransaction(e.to_string()))?;
    let message = Message::from_digest(envelope.signing_hash());
    let public = Secp256k1::verification_only()
        .recover_ecdsa(&message, &signature)
        .map_err(|e| PipelineError::MalformedTransaction(e.to_string()))?;

    Ok(DecodedTransaction {
        envelope,
        sender: address_from_public_key(&public),
        hash: Hash::from_slice(&Keccak256::digest(raw)),
    })
}

fn fixed_bytes(rlp: &Rlp, index: usize, width: usize) -> Result<Vec<u8>, PipelineError> {
    let bytes: Vec<u8> = rlp
        .val_at(index)
        .map_err(|e| rlp_error(&format!("field {}", index), e))?;
    if bytes.len() > width {
        return Err(PipelineError::MalformedTransaction(format!(
            "field {} too large: {} bytes",
            index,
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width];
    out[width - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

fn rlp_error(field: &str, e: rlp::DecoderError) -> PipelineError {
    PipelineError::MalformedTransaction(format!("RLP decode error for {}: {:?}", field, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::derive_account;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn envelope(to: Option<Address>) -> TransactionEnvelope {
        TransactionEnvelope {
            nonce: 7,
            gas_price: U256::from(1_000_000_000u64),
            gas_limit: 800_000,
            to,
            data: vec![0x60, 0xfe, 0x47, 0xb1],
            chain_id: 1337,
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let env = envelope(Some(Address::repeat_byte(0x42)));
        let first = sign(&env, KEY).unwrap();
        let second = sign(&env, KEY).unwrap();
        assert_eq!(first.raw, second.raw);
        assert_eq!(first.hash, second.hash);
    }

    #[test]
    fn test_v_is_eip155() {
        let signed = sign(&envelope(None), KEY).unwrap();
        assert!(signed.v == 1337 * 2 + 35 || signed.v == 1337 * 2 + 36);
    }

    #[test]
    fn test_decode_recovers_sender_and_fields() {
        let env = envelope(Some(Address::repeat_byte(0x42)));
        let signed = sign(&env, KEY).unwrap();
        let decoded = decode_signed(&signed.raw).unwrap();

        assert_eq!(decoded.envelope, env);
        assert_eq!(decoded.sender, derive_account(KEY).unwrap().address);
        assert_eq!(decoded.hash, signed.hash);
    }

    #[test]
    fn test_creation_has_empty_recipient() {
        let signed = sign(&envelope(None), KEY).unwrap();
        let rlp = Rlp::new(&signed.raw);
        let to: Vec<u8> = rlp.val_at(3).unwrap();
        assert!(to.is_empty());
        assert!(decode_signed(&signed.raw).unwrap().envelope.is_creation());
    }

    #[test]
    fn test_zero_gas_price_encodes_as_empty() {
        let mut env = envelope(Some(Address::repeat_byte(0x01)));
        env.gas_price = U256::ZERO;
        let signed = sign(&env, KEY).unwrap();
        let decoded = decode_signed(&signed.raw).unwrap();
        assert!(decoded.envelope.gas_price.is_zero());
    }

    #[test]
    fn test_signing_hash_changes_with_chain_id() {
        let env = envelope(None);
        let mut other = env.clone();
        other.chain_id = 1;
        assert_ne!(env.signing_hash(), other.signing_hash());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_signed(&[0x01, 0x02]).is_err());
        let mut stream = RlpStream::new_list(2);
        stream.append(&1u64);
        stream.append(&2u64);
        assert!(decode_signed(&stream.out()).is_err());
    }
}
