//! # Deployment Manager
//!
//! ```text
//! deploy(type, args?, key)
//!   ├── per-type mutex                  one deployment per type at a time
//!   ├── ArtifactSource::load            ArtifactNotFound | ArtifactInvalid
//!   ├── creation_code(args | defaults)  Codec(InvalidArgument)
//!   ├── TransactionSubmitter::execute   Pipeline(..) | DeploymentReverted
//!   ├── receipt.contractAddress         DeploymentReverted if absent
//!   └── DeploymentRegistry::save        Registry(..)
//! ```

use chrono::{DateTime, Utc};
use rc_01_transaction_pipeline::{
    GasLimitPolicy, PipelineError, TimeSource, TransactionRequest, TransactionSubmitter,
};
use serde_json::Value;
use shared_types::{address_hex, hash_hex, ContractType};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::artifact::ArtifactStatus;
use crate::domain::deployment::Deployment;
use crate::domain::errors::DeploymentError;
use crate::ports::outbound::{ArtifactSource, DeploymentRegistry};

#[derive(Debug, Clone)]
pub struct DeploymentConfig {
    /// Margin over `eth_estimateGas`; the type's deploy limit is the cap.
    pub gas_buffer_percent: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            gas_buffer_percent: rc_01_transaction_pipeline::domain::gas::DEFAULT_GAS_BUFFER_PERCENT,
        }
    }
}

pub struct DeploymentManager {
    submitter: Arc<dyn TransactionSubmitter>,
    artifacts: Arc<dyn ArtifactSource>,
    registry: Arc<dyn DeploymentRegistry>,
    time: Arc<dyn TimeSource>,
    config: DeploymentConfig,
    locks: HashMap<ContractType, Mutex<()>>,
}

impl DeploymentManager {
    pub fn new(
        submitter: Arc<dyn TransactionSubmitter>,
        artifacts: Arc<dyn ArtifactSource>,
        registry: Arc<dyn DeploymentRegistry>,
        time: Arc<dyn TimeSource>,
        config: DeploymentConfig,
    ) -> Self {
        Self {
            submitter,
            artifacts,
            registry,
            time,
            config,
            locks: ContractType::ALL
                .iter()
                .map(|ty| (*ty, Mutex::new(())))
                .collect(),
        }
    }

    /// Deploys `contract_type`, replacing any previous deployment entry.
    ///
    /// `constructor_args` of `None` uses the type's defaults.
    pub async fn deploy(
        &self,
        contract_type: ContractType,
        constructor_args: Option<Vec<Value>>,
        private_key_hex: &str,
    ) -> Result<Deployment, DeploymentError> {
        let _serialized = match self.locks.get(&contract_type) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let artifact = self.artifacts.load(contract_type)?;
        let args = constructor_args.unwrap_or_else(|| contract_type.default_constructor_args());
        let init_code = artifact.creation_code(&args)?;

        info!(
            contract_type = %contract_type,
            contract = contract_type.contract_name(),
            args = %serde_json::Value::Array(args.clone()),
            "Deploying contract"
        );

        let policy = GasLimitPolicy::estimated_with_cap(
            contract_type.deploy_gas_limit(),
            self.config.gas_buffer_percent,
        );
        let outcome = self
            .submitter
            .execute(private_key_hex, TransactionRequest::create(init_code, policy))
            .await
            .map_err(|e| match e {
                PipelineError::TransactionReverted { tx_hash } => DeploymentError::DeploymentReverted(
                    format!("transaction {} reverted", hash_hex(&tx_hash)),
                ),
                other => DeploymentError::Pipeline(other),
            })?;

        let contract_address = outcome.receipt.contract_address.ok_or_else(|| {
            DeploymentError::DeploymentReverted("receipt has no contract address".into())
        })?;

        let deployment = Deployment::from_outcome(
            contract_type,
            contract_address,
            args,
            &outcome,
            self.now(),
        );
        self.registry.save(&deployment)?;

        info!(
            contract_type = %contract_type,
            address = %address_hex(&contract_address),
            tx_hash = %hash_hex(&deployment.transaction_hash),
            gas_used = deployment.gas_used,
            gas_limit = deployment.gas_limit,
            "Contract deployed"
        );
        Ok(deployment)
    }

    /// The recorded deployment for `contract_type`.
    pub fn deployment(&self, contract_type: ContractType) -> Result<Deployment, DeploymentError> {
        self.registry
            .load(contract_type)?
            .ok_or(DeploymentError::NotDeployed(contract_type))
    }

    /// Every type, deployed or not. A corrupt entry is reported as absent.
    pub fn all_deployments(&self) -> BTreeMap<ContractType, Option<Deployment>> {
        ContractType::ALL
            .iter()
            .map(|ty| {
                let entry = self.registry.load(*ty).unwrap_or_else(|e| {
                    warn!(contract_type = %ty, error = %e, "Unreadable deployment entry");
                    None
                });
                (*ty, entry)
            })
            .collect()
    }

    pub fn artifact_status(&self) -> BTreeMap<ContractType, ArtifactStatus> {
        ContractType::ALL
            .iter()
            .map(|ty| (*ty, self.artifacts.status(*ty)))
            .collect()
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.time.now_millis()).unwrap_or_default()
    }
}
