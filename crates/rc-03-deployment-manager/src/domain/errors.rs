//! Deployment errors.

use rc_01_transaction_pipeline::PipelineError;
use rc_02_record_codec::CodecError;
use shared_types::{ContractType, TypeError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure reading or writing the deployment registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry entry is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("unknown contract type '{0}'; valid types: {}", ContractType::catalogue())]
    UnknownContractType(String),

    #[error("contract artifact not found: {}", .path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("contract artifact is invalid: {0}")]
    ArtifactInvalid(String),

    #[error("{} contract not deployed", .0.contract_name())]
    NotDeployed(ContractType),

    #[error("deployment failed: {0}")]
    DeploymentReverted(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<TypeError> for DeploymentError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownContractType(name) => DeploymentError::UnknownContractType(name),
            other => DeploymentError::ArtifactInvalid(other.to_string()),
        }
    }
}
