//! # Deployment Manager (rc-03)
//!
//! Deploys the storage contracts and remembers where they live.
//!
//! ```text
//! ArtifactSource ──► ContractArtifact ──► creation code
//!                                              │
//!                               TransactionSubmitter (rc-01)
//!                                              │
//!                                   Deployment ──► DeploymentRegistry
//! ```
//!
//! Every read or write against an entity type starts by loading its
//! [`Deployment`]; a missing entry is [`DeploymentError::NotDeployed`].

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{ArtifactDirectory, JsonFileRegistry, MemoryRegistry};
pub use domain::*;
pub use ports::*;
pub use service::{DeploymentConfig, DeploymentManager};
