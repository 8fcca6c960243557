pub mod artifact;
pub mod deployment;
pub mod errors;

pub use artifact::{AbiEntry, AbiParam, ArtifactStatus, ContractArtifact};
pub use deployment::{Deployment, TransactionDetails};
pub use errors::{DeploymentError, RegistryError};
