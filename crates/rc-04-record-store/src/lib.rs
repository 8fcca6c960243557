//! # Record Store
//!
//! Typed access to the five entity storage contracts and the simple value
//! contract. Reads go through `eth_call`; writes go through the transaction
//! pipeline. Contract addresses come from the deployment registry on every
//! operation, so a redeploy is picked up without a restart.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod service;
pub mod views;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::*;
pub use service::{RecordStore, RecordStores, SimpleStore, StoreContext};
