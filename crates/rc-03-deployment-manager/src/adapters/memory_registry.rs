//! In-process registry, for tests and ephemeral runs.

use parking_lot::RwLock;
use shared_types::ContractType;
use std::collections::HashMap;

use crate::domain::deployment::Deployment;
use crate::domain::errors::RegistryError;
use crate::ports::outbound::DeploymentRegistry;

#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<ContractType, Deployment>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeploymentRegistry for MemoryRegistry {
    fn load(&self, contract_type: ContractType) -> Result<Option<Deployment>, RegistryError> {
        Ok(self.entries.read().get(&contract_type).cloned())
    }

    fn save(&self, deployment: &Deployment) -> Result<(), RegistryError> {
        self.entries
            .write()
            .insert(deployment.contract_type, deployment.clone());
        Ok(())
    }
}
