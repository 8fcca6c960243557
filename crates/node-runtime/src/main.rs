//! Record chain gateway entry point.
//!
//! Configuration comes from environment variables (see
//! [`node_runtime::NodeConfig`]); log verbosity from `RUST_LOG`.

use anyhow::Context;
use node_runtime::{NodeConfig, NodeContainer};
use rc_05_api_gateway::ApiGatewayService;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("===========================================");
    info!("  Record Chain Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = NodeConfig::from_env();
    config.validate().context("invalid configuration")?;
    if config.signer.get().is_none() {
        info!("PRIVATE_KEY not set; write requests must carry privateKey");
    }

    let container = NodeContainer::new(config).context("failed to create chain client")?;
    let gateway = container.config.gateway();
    let service = ApiGatewayService::new(gateway, container.app_state())?;

    info!("Press Ctrl+C to stop");
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown signal received");
    };
    service.serve(shutdown).await?;

    info!("Gateway stopped");
    Ok(())
}
