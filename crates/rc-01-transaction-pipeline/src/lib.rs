//! # Transaction Pipeline (rc-01)
//!
//! Turns a raw private key and a payload into a mined, successful transaction
//! on an Ethereum-compatible permissioned chain.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  TRANSACTION PIPELINE (rc-01)                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Signer ──► Nonce/Gas Resolver ──► Builder ──► Broadcaster   │
//! │  (secp256k1)   (pending nonce,       (EIP-155    (send raw,   │
//! │                 gas policies)         envelope)   poll receipt)│
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │ ChainRpc (JSON-RPC over HTTP)
//!                             ▼
//!                       permissioned node
//! ```
//!
//! ## Ordering Guarantees
//!
//! | Guarantee | Mechanism |
//! |---|---|
//! | One in-flight tx per account | `AccountQueue` (per-address async mutex) |
//! | No nonce reuse under lagging `pending` | `NonceTracker`: `max(pending, local)` |
//! | Recovery after rejection | local counter invalidated, chain re-read |
//! | At-most-once broadcast | no automatic retries anywhere |
//!
//! ## Outcome Classification
//!
//! | Situation | Error |
//! |---|---|
//! | Node unreachable while resolving | `ResolutionFailed` |
//! | Node refuses the raw transaction | `SubmissionRejected` |
//! | Mined with `status = false` | `TransactionReverted` |
//! | Transport failure after resolution | `NetworkUnavailable` |

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{HttpChainClient, HttpClientConfig};
pub use domain::*;
pub use ports::*;
pub use service::{PipelineConfig, TransactionPipeline};
