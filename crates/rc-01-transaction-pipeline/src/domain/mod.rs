//! Domain layer: pure transaction logic with no network access.

pub mod account;
pub mod builder;
pub mod envelope;
pub mod errors;
pub mod gas;
pub mod nonce;
pub mod receipt;

pub use account::{derive_account, normalize_key_input, Account, PrivateKey};
pub use builder::{build, check_payload, parse_recipient};
pub use envelope::{decode_signed, sign, DecodedTransaction, SignedTransaction, TransactionEnvelope};
pub use errors::PipelineError;
pub use gas::{GasLimitPolicy, GasPricePolicy, ResolvedGas};
pub use nonce::{AccountQueue, NonceTracker};
pub use receipt::Receipt;
