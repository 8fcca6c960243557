//! Component wiring.
//!
//! ```text
//! HttpChainClient ──► TransactionPipeline ──► DeploymentManager
//!        │                    │                      │
//!        └────────────────────┴──► RecordStores ◄────┘ (registry)
//!                                       │
//!                                   AppState ──► ApiGatewayService
//! ```

pub mod config;

pub use config::{ConfigError, NodeConfig};

use rc_01_transaction_pipeline::{
    ChainRpc, GasPricePolicy, HttpChainClient, HttpClientConfig, PipelineConfig, RpcError,
    SystemTimeSource, TransactionPipeline, TransactionSubmitter,
};
use rc_03_deployment_manager::{
    ArtifactDirectory, DeploymentConfig, DeploymentManager, DeploymentRegistry, JsonFileRegistry,
};
use rc_04_record_store::{RecordStores, StoreContext};
use rc_05_api_gateway::{AppState, ChainInfo, GatewayConfig, HttpConfig};
use shared_types::U256;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

impl NodeConfig {
    pub fn http_client(&self) -> HttpClientConfig {
        HttpClientConfig {
            url: self.chain.url.clone(),
            request_timeout: self.chain.rpc_timeout,
            connect_timeout: Duration::from_secs(5).min(self.chain.rpc_timeout),
        }
    }

    pub fn pipeline(&self) -> PipelineConfig {
        let gas_price_policy = if self.gas.force_zero_gas {
            GasPricePolicy::AllowZero
        } else {
            GasPricePolicy::Floor(U256::from(self.gas.price_floor_wei))
        };
        PipelineConfig {
            chain_id: self.chain.chain_id,
            gas_price_policy,
            receipt_poll_interval: self.receipts.poll_interval,
            receipt_timeout: self.receipts.timeout,
        }
    }

    pub fn deployment(&self) -> DeploymentConfig {
        DeploymentConfig {
            gas_buffer_percent: self.gas.buffer_percent,
        }
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            http: HttpConfig {
                host: self.server.host,
                port: self.server.port,
            },
            chain: ChainInfo {
                url: self.chain.url.clone(),
                chain_id: self.chain.chain_id,
            },
            default_key: self.signer.clone(),
            ..GatewayConfig::default()
        }
    }
}

/// Every long-lived component of a running node.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub rpc: Arc<dyn ChainRpc>,
    pub pipeline: Arc<TransactionPipeline>,
    pub deployments: Arc<DeploymentManager>,
    pub stores: Arc<RecordStores>,
}

impl NodeContainer {
    pub fn new(config: NodeConfig) -> Result<Self, RpcError> {
        let client = HttpChainClient::new(&config.http_client())?;
        Ok(Self::with_rpc(config, Arc::new(client)))
    }

    /// Wires the node around an existing chain client.
    pub fn with_rpc(config: NodeConfig, rpc: Arc<dyn ChainRpc>) -> Self {
        let pipeline = Arc::new(TransactionPipeline::new(rpc.clone(), config.pipeline()));
        let submitter: Arc<dyn TransactionSubmitter> = pipeline.clone();
        let registry: Arc<dyn DeploymentRegistry> =
            Arc::new(JsonFileRegistry::new(&config.storage.deployment_dir));

        let deployments = Arc::new(DeploymentManager::new(
            submitter.clone(),
            Arc::new(ArtifactDirectory::new(&config.storage.artifact_dir)),
            registry.clone(),
            Arc::new(SystemTimeSource),
            config.deployment(),
        ));
        let stores = Arc::new(RecordStores::new(StoreContext {
            rpc: rpc.clone(),
            submitter,
            registry,
        }));

        info!(
            chain = %config.chain.url,
            chain_id = config.chain.chain_id,
            deployment_dir = %config.storage.deployment_dir.display(),
            artifact_dir = %config.storage.artifact_dir.display(),
            "Node components wired"
        );

        Self {
            config,
            rpc,
            pipeline,
            deployments,
            stores,
        }
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            rpc: self.rpc.clone(),
            deployments: self.deployments.clone(),
            stores: self.stores.clone(),
            config: Arc::new(self.config.gateway()),
        }
    }
}
