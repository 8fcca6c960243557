//! # Shared Types Crate
//!
//! Chain primitives and the contract catalogue shared by every subsystem.
//!
//! ## Design Principles
//!
//! - **Hex on the wire**: quantities, hashes and payloads serialize the way
//!   Ethereum JSON-RPC expects them (`0x`-prefixed hex).
//! - **Closed catalogue**: [`ContractType`] is the only key for artifacts,
//!   deployment files and record stores. Unknown types are rejected at parse time.

pub mod contract;
pub mod errors;
pub mod primitives;

pub use contract::ContractType;
pub use errors::TypeError;
pub use primitives::*;
