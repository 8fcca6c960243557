//! # Record Codec (rc-02)
//!
//! Pure translation between domain values and contract bytes. No I/O.
//!
//! - [`abi`]: selectors, head/tail encoding, bounds-checked decoding and
//!   JSON-to-token coercion for constructor arguments.
//! - [`domain`]: the five-field record every storage contract holds, its
//!   calldata, and timestamp normalization.
//!
//! ## Timestamp Rules
//!
//! | Direction | Form |
//! |---|---|
//! | Caller → chain | ISO-8601 (floored to seconds) or integer seconds |
//! | Chain | `uint256` Unix seconds |
//! | Chain → caller | `2024-01-01T00:00:00.000Z` |

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod abi;
pub mod domain;

pub use abi::{ParamType, Token};
pub use domain::*;
