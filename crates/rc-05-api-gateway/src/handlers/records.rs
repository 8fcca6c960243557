//! Generic record routes, mounted once per schema under `/<plural>`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rc_02_record_codec::RecordInput;
use rc_03_deployment_manager::{Deployment, DeploymentError};
use rc_04_record_store::{RecordList, RecordSchema, RecordStore, StoreError};
use serde_json::{json, Map, Value};
use shared_types::{address_hex, hash_hex, Address};
use std::sync::Arc;
use tracing::warn;

use crate::domain::error::ApiError;
use crate::router::AppState;

use super::now_iso;

#[derive(Clone)]
pub struct EntityState {
    pub app: AppState,
    pub schema: RecordSchema,
    pub store: Arc<RecordStore>,
}

impl EntityState {
    fn entity(&self) -> String {
        self.schema.entity.to_lowercase()
    }
}

pub fn routes() -> Router<EntityState> {
    Router::new()
        .route("/", get(list).post(store))
        .route("/:id", get(get_record).head(head_record))
        .route("/:id/metadata", get(get_metadata))
}

/// `{"success", <key>: [...], "total", "contractAddress", "metadata"}`
pub fn list_body(key: &str, list: &RecordList) -> Result<Map<String, Value>, ApiError> {
    let records = serde_json::to_value(&list.records)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let mut body = Map::new();
    body.insert("success".into(), json!(true));
    body.insert(key.into(), records);
    body.insert("total".into(), json!(list.total()));
    body.insert(
        "contractAddress".into(),
        json!(address_hex(&list.contract_address())),
    );
    body.insert("metadata".into(), contract_metadata(&list.deployment));
    Ok(body)
}

fn contract_metadata(deployment: &Deployment) -> Value {
    json!({
        "blockchainNetwork": deployment.transaction_details.chain_id,
        "contractType": deployment.contract_name,
        "deploymentTime": deployment.deployment_time,
    })
}

/// Serializes `value` and appends `success` and `contractAddress`.
fn located_body<T: serde::Serialize>(value: &T, address: Address) -> Result<Value, ApiError> {
    let mut body = match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(ApiError::internal(e.to_string())),
    };
    body.insert("success".into(), json!(true));
    body.insert("contractAddress".into(), json!(address_hex(&address)));
    Ok(Value::Object(body))
}

async fn list(State(state): State<EntityState>) -> Result<Json<Value>, ApiError> {
    let operation = format!("list_{}", state.schema.collection());
    let list = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::from(e).during(&operation))?;
    Ok(Json(Value::Object(list_body(&state.schema.collection(), &list)?)))
}

async fn store(State(state): State<EntityState>, body: String) -> Result<Json<Value>, ApiError> {
    let operation = state.schema.store_operation();
    let body: Map<String, Value> = crate::domain::requests::parse_body(&body)?;
    let key = state
        .app
        .signing_key(body.get("privateKey").and_then(Value::as_str))?;

    let body_key = state.schema.body_key();
    let input: RecordInput = match body.get(&body_key) {
        Some(Value::Object(record)) => serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| ApiError::bad_request(format!("invalid {}: {}", body_key, e)))?,
        _ => return Err(StoreError::MissingRecordId(body_key).into()),
    };

    let outcome = state
        .store
        .store(input, &key)
        .await
        .map_err(|e| ApiError::from(e).during(&operation))?;

    Ok(Json(json!({
        "success": true,
        "operation": operation,
        "recordId": outcome.record_id,
        "contractAddress": address_hex(&outcome.contract_address),
        "transactionHash": hash_hex(&outcome.receipt.transaction_hash),
        "blockNumber": outcome.receipt.block_number,
        "blockHash": hash_hex(&outcome.receipt.block_hash),
        "gasUsed": outcome.receipt.gas_used,
        "timestamp": now_iso(),
    })))
}

async fn get_record(
    State(state): State<EntityState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let found = state
        .store
        .get(&id)
        .await
        .map_err(|e| ApiError::from(e).during(format!("get_{}", state.entity())))?;
    Ok(Json(located_body(&found.value, found.contract_address)?))
}

async fn get_metadata(
    State(state): State<EntityState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let found = state
        .store
        .metadata(&id)
        .await
        .map_err(|e| ApiError::from(e).during(format!("get_{}_metadata", state.entity())))?;
    Ok(Json(located_body(&found.value, found.contract_address)?))
}

/// Existence probe: 200, 404 (absent or not deployed) or 500. No body.
async fn head_record(State(state): State<EntityState>, Path(id): Path<String>) -> StatusCode {
    match state.store.exists(&id).await {
        Ok(true) => StatusCode::OK,
        Ok(false) | Err(StoreError::Deployment(DeploymentError::NotDeployed(_))) => {
            StatusCode::NOT_FOUND
        }
        Err(e) => {
            warn!(entity = state.schema.entity, record_id = %id, error = %e, "Existence check failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
