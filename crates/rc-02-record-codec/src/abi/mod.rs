//! Solidity ABI subset: selectors, head/tail encoding, bounds-checked
//! decoding and JSON argument coercion.

pub mod decode;
pub mod encode;
pub mod json;
pub mod types;

pub use decode::{decode, decode_single};
pub use encode::{encode, encode_call, selector};
pub use json::{tokenize, tokenize_all};
pub use types::{ParamType, Token};
