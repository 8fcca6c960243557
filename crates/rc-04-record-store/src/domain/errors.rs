//! Store errors.

use rc_01_transaction_pipeline::{PipelineError, RpcError};
use rc_02_record_codec::CodecError;
use rc_03_deployment_manager::{DeploymentError, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// `doesXExist` answered false.
    #[error("{entity} {record_id} not found")]
    NotFound {
        entity: &'static str,
        record_id: String,
    },

    #[error("{0} with recordId required")]
    MissingRecordId(String),

    /// Read-only contract call failed.
    #[error("contract call failed: {0}")]
    Call(#[from] RpcError),

    #[error(transparent)]
    Deployment(#[from] DeploymentError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<RegistryError> for StoreError {
    fn from(err: RegistryError) -> Self {
        StoreError::Deployment(DeploymentError::Registry(err))
    }
}
