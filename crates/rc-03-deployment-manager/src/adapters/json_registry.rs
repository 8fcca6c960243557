//! # JSON File Registry
//!
//! One pretty-printed `contract-deployment-<type>.json` per contract type.
//!
//! Writes go to a temp file that is synced and then renamed over the target,
//! so readers never observe a half-written entry. An advisory `fs2` lock on
//! `.deployments.lock` serializes writers that share the directory.

use fs2::FileExt;
use shared_types::ContractType;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::deployment::Deployment;
use crate::domain::errors::RegistryError;
use crate::ports::outbound::DeploymentRegistry;

#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    dir: PathBuf,
}

impl JsonFileRegistry {
    const LOCK_FILE: &'static str = ".deployments.lock";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, contract_type: ContractType) -> PathBuf {
        self.dir.join(contract_type.deployment_file())
    }

    fn lock(&self) -> Result<WriterLock, RegistryError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(Self::LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(WriterLock { file })
    }
}

/// Released on drop.
struct WriterLock {
    file: File,
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl DeploymentRegistry for JsonFileRegistry {
    fn load(&self, contract_type: ContractType) -> Result<Option<Deployment>, RegistryError> {
        let raw = match std::fs::read_to_string(self.path_for(contract_type)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, deployment: &Deployment) -> Result<(), RegistryError> {
        std::fs::create_dir_all(&self.dir)?;
        let _guard = self.lock()?;

        let path = self.path_for(deployment.contract_type);
        let temp_path = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(deployment)?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&body)?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &path)?;

        debug!(path = %path.display(), "Deployment entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deployment::TransactionDetails;
    use shared_types::{Address, Hash, U256};

    fn deployment(contract_type: ContractType, address: Address) -> Deployment {
        Deployment {
            success: true,
            contract_type,
            contract_name: contract_type.contract_name().to_string(),
            contract_address: address,
            transaction_hash: Hash::repeat_byte(1),
            block_number: 1,
            block_hash: Hash::repeat_byte(2),
            gas_used: 100_000,
            gas_limit: 120_000,
            gas_price: U256::from(1_000_000_000u64),
            deployer_address: Address::repeat_byte(3),
            deployment_time: chrono::DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
            constructor_args: vec![serde_json::json!(123)],
            transaction_details: TransactionDetails::default(),
        }
    }

    #[test]
    fn test_absent_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileRegistry::new(dir.path());
        assert!(registry.load(ContractType::Simple).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileRegistry::new(dir.path());
        let entry = deployment(ContractType::Simple, Address::repeat_byte(9));
        registry.save(&entry).unwrap();

        let path = dir.path().join("contract-deployment-simple.json");
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"contractAddress\""));
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(registry.load(ContractType::Simple).unwrap(), Some(entry));
    }

    #[test]
    fn test_save_replaces_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let registry = JsonFileRegistry::new(dir.path());
        registry
            .save(&deployment(ContractType::Task, Address::repeat_byte(1)))
            .unwrap();
        registry
            .save(&deployment(ContractType::Task, Address::repeat_byte(2)))
            .unwrap();
        let loaded = registry.load(ContractType::Task).unwrap().unwrap();
        assert_eq!(loaded.contract_address, Address::repeat_byte(2));
    }

    #[test]
    fn test_corrupt_entry_is_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("contract-deployment-user.json"), "{").unwrap();
        let registry = JsonFileRegistry::new(dir.path());
        assert!(matches!(
            registry.load(ContractType::User),
            Err(RegistryError::Serde(_))
        ));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deployments");
        let registry = JsonFileRegistry::new(&nested);
        registry
            .save(&deployment(ContractType::Company, Address::repeat_byte(4)))
            .unwrap();
        assert!(nested.join("contract-deployment-company.json").exists());
    }
}
