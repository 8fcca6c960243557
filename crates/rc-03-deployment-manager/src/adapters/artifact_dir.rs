//! Artifacts read from `<artifact_dir>/<ContractName>.json`.

use serde_json::Value;
use shared_types::ContractType;
use std::path::{Path, PathBuf};

use crate::domain::artifact::{ArtifactStatus, ContractArtifact};
use crate::domain::errors::DeploymentError;
use crate::ports::outbound::ArtifactSource;

#[derive(Debug, Clone)]
pub struct ArtifactDirectory {
    dir: PathBuf,
}

impl ArtifactDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, contract_type: ContractType) -> PathBuf {
        self.dir.join(contract_type.artifact_file())
    }

    fn read_document(path: &Path) -> Result<Value, DeploymentError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DeploymentError::ArtifactNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                DeploymentError::ArtifactInvalid(format!("{}: {}", path.display(), e))
            }
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| DeploymentError::ArtifactInvalid(format!("{}: {}", path.display(), e)))
    }
}

impl ArtifactSource for ArtifactDirectory {
    fn load(&self, contract_type: ContractType) -> Result<ContractArtifact, DeploymentError> {
        let document = Self::read_document(&self.path_for(contract_type))?;
        ContractArtifact::from_json(&document)
    }

    fn status(&self, contract_type: ContractType) -> ArtifactStatus {
        let path = self.path_for(contract_type);
        let file = path.display().to_string();
        match Self::read_document(&path) {
            Ok(document) => ArtifactStatus::inspect(file, &document),
            Err(DeploymentError::ArtifactNotFound { .. }) => ArtifactStatus::missing(file),
            Err(e) => ArtifactStatus::unreadable(file, e.to_string()),
        }
    }
}
