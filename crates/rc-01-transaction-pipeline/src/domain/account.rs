//! # Signer Account
//!
//! Derives the signing account from a raw secp256k1 private key.
//!
//! Address = `keccak256(uncompressed_pubkey[1..])[12..]`

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use shared_types::Address;
use std::fmt;

use super::errors::PipelineError;

/// Raw private key material. Never persisted, never printed.
#[derive(Clone)]
pub struct PrivateKey {
    secret: SecretKey,
}

impl PrivateKey {
    /// Parses exactly 64 hex characters with no `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, PipelineError> {
        if value.len() != 64 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(PipelineError::InvalidKeyFormat);
        }
        let bytes = hex::decode(value).map_err(|_| PipelineError::InvalidKeyFormat)?;
        // Rejects zero and scalars at or above the curve order.
        let secret = SecretKey::from_slice(&bytes).map_err(|_| PipelineError::InvalidKeyFormat)?;
        Ok(Self { secret })
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn address(&self) -> Address {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &self.secret);
        address_from_public_key(&public)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A signer: derived address plus the key it came from.
#[derive(Debug, Clone)]
pub struct Account {
    pub address: Address,
    key: PrivateKey,
}

impl Account {
    pub fn key(&self) -> &PrivateKey {
        &self.key
    }
}

/// Derives the account for a 64-hex-character private key.
pub fn derive_account(private_key_hex: &str) -> Result<Account, PipelineError> {
    let key = PrivateKey::from_hex(private_key_hex)?;
    Ok(Account {
        address: key.address(),
        key,
    })
}

pub fn address_from_public_key(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Strips one leading `0x` from caller-supplied key input.
pub fn normalize_key_input(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}
