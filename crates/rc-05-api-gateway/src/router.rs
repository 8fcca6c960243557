//! Route table.
//!
//! ```text
//! /                         server info
//! /health                   chain connectivity
//! /deploy /deployments      deployment manager
//! /debug                    artifact status
//! /simple                   simple value store
//! /<plural>/...             one nested router per record schema
//! ```

use axum::routing::{get, post};
use axum::Router;
use rc_01_transaction_pipeline::ChainRpc;
use rc_03_deployment_manager::DeploymentManager;
use rc_04_record_store::{RecordSchema, RecordStores};
use std::sync::Arc;
use tower::ServiceBuilder;

use crate::domain::config::GatewayConfig;
use crate::domain::error::ApiError;
use crate::handlers::{core, records, views};
use crate::middleware::{create_cors_layer, request_trace_layer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub rpc: Arc<dyn ChainRpc>,
    pub deployments: Arc<DeploymentManager>,
    pub stores: Arc<RecordStores>,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Body key, else the configured default; one leading `0x` is stripped.
    pub fn signing_key(&self, provided: Option<&str>) -> Result<String, ApiError> {
        provided
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.config.default_key.get())
            .map(|k| rc_01_transaction_pipeline::normalize_key_input(k).to_string())
            .ok_or_else(|| ApiError::bad_request("privateKey required"))
    }
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(core::server_info))
        .route("/health", get(core::health))
        .route("/deploy", post(core::deploy))
        .route("/deployments", get(core::deployments))
        .route("/debug", get(core::debug))
        .route("/simple", get(core::get_simple).post(core::set_simple));

    for schema in RecordSchema::all() {
        let Some(store) = state.stores.get(schema.contract_type) else {
            continue;
        };
        let entity = records::EntityState {
            app: state.clone(),
            schema: *schema,
            store,
        };
        let nested = views::extend(schema, records::routes()).with_state(entity);
        router = router.nest(&format!("/{}", schema.collection()), nested);
    }

    let middleware = ServiceBuilder::new()
        .layer(request_trace_layer())
        .layer(create_cors_layer(&state.config.cors));

    router
        .fallback(core::route_not_found)
        .layer(middleware)
        .with_state(state)
}
