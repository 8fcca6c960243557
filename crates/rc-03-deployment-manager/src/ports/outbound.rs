//! # Outbound Ports
//!
//! Where artifacts come from and where deployments are kept.

use shared_types::ContractType;

use crate::domain::artifact::{ArtifactStatus, ContractArtifact};
use crate::domain::deployment::Deployment;
use crate::domain::errors::{DeploymentError, RegistryError};

/// Source of compiled contracts.
pub trait ArtifactSource: Send + Sync {
    /// `ArtifactNotFound` if absent, `ArtifactInvalid` if unusable.
    fn load(&self, contract_type: ContractType) -> Result<ContractArtifact, DeploymentError>;

    /// Diagnostic view that never fails.
    fn status(&self, contract_type: ContractType) -> ArtifactStatus;
}

/// Persistent map from contract type to its deployment.
pub trait DeploymentRegistry: Send + Sync {
    fn load(&self, contract_type: ContractType) -> Result<Option<Deployment>, RegistryError>;

    /// Replaces any previous entry for the same type.
    fn save(&self, deployment: &Deployment) -> Result<(), RegistryError>;
}
