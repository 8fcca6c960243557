//! Server info, health, deployment and simple value routes.

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rc_04_record_store::RecordSchema;
use serde_json::{json, Map, Value};
use shared_types::{address_hex, hash_hex, ContractType};
use tracing::{error, info, warn};

use crate::domain::error::{route_not_found as not_found_error, ApiError};
use crate::domain::requests::{parse_body, DeployRequest, SetValueRequest};
use crate::router::AppState;

use super::now_iso;

const DEPLOY_SUGGESTIONS: [&str; 4] = [
    "Check if contracts are compiled correctly",
    "Verify constructor arguments",
    "Ensure sufficient gas limit",
    "Check blockchain connection",
];

fn endpoint_catalogue() -> Value {
    let mut endpoints = Map::new();
    endpoints.insert(
        "core".into(),
        json!([
            "GET /",
            "GET /health",
            "POST /deploy",
            "GET /deployments",
            "GET /debug",
            "GET /simple",
            "POST /simple"
        ]),
    );
    for schema in RecordSchema::all() {
        let base = format!("/{}", schema.collection());
        let mut routes = vec![
            format!("GET {}", base),
            format!("POST {}", base),
            format!("GET {}/:id", base),
            format!("GET {}/:id/metadata", base),
            format!("HEAD {}/:id", base),
        ];
        match schema.contract_type {
            ContractType::User => routes.extend([
                format!("GET {}/role/:roleName", base),
                format!("GET {}/type/:userType", base),
                format!("GET {}/status/:enabled", base),
            ]),
            ContractType::Company => routes.push(format!("GET {}/:id/financial", base)),
            ContractType::Attendance => routes.extend([
                format!("GET {}/employee/:employeeId", base),
                format!("GET {}/date/:startDate/:endDate", base),
            ]),
            _ => {}
        }
        endpoints.insert(schema.contract_type.as_str().into(), json!(routes));
    }
    Value::Object(endpoints)
}

pub async fn server_info(State(state): State<AppState>) -> Json<Value> {
    let contracts: Vec<&str> = ContractType::ALL.iter().map(ContractType::as_str).collect();
    Json(json!({
        "name": "Record Chain Gateway",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "blockchain": {
            "url": state.config.chain.url,
            "chainId": state.config.chain.chain_id,
        },
        "contracts": contracts,
        "endpoints": endpoint_catalogue(),
    }))
}

/// 200 with chain facts, or 503 when the node is unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let probe = async {
        let listening = state.rpc.is_listening().await?;
        let chain_id = state.rpc.chain_id().await?;
        let block_number = state.rpc.block_number().await?;
        Ok::<_, rc_01_transaction_pipeline::RpcError>((listening, chain_id, block_number))
    };
    match probe.await {
        Ok((listening, chain_id, block_number)) => Json(json!({
            "connected": listening,
            "chainId": chain_id,
            "blockNumber": block_number,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"connected": false, "error": e.to_string()})),
            )
                .into_response()
        }
    }
}

pub async fn deploy(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let request: DeployRequest = parse_body(&body)?;
    let key = state.signing_key(request.private_key.as_deref())?;
    let contract_type = request
        .contract_type
        .as_deref()
        .and_then(|t| t.parse::<ContractType>().ok())
        .ok_or_else(|| {
            ApiError::bad_request(format!("contractType required: {}", ContractType::catalogue()))
        })?;

    info!(contract_type = %contract_type, "Deploy requested");
    match state
        .deployments
        .deploy(contract_type, request.constructor_args, &key)
        .await
    {
        Ok(deployment) => Ok(Json(deployment).into_response()),
        Err(e) => {
            error!(contract_type = %contract_type, error = %e, "Deployment failed");
            let err = ApiError::from(e);
            if err.status.is_server_error() {
                return Err(err.with_field("success", json!(false)).with_field(
                    "troubleshooting",
                    json!({ "suggestions": DEPLOY_SUGGESTIONS }),
                ));
            }
            Err(err)
        }
    }
}

pub async fn deployments(State(state): State<AppState>) -> Json<Value> {
    let data: Map<String, Value> = state
        .deployments
        .all_deployments()
        .into_iter()
        .map(|(contract_type, deployment)| {
            let value = deployment
                .and_then(|d| serde_json::to_value(d).ok())
                .unwrap_or_else(|| json!({"deployed": false}));
            (contract_type.as_str().to_string(), value)
        })
        .collect();
    Json(json!({"success": true, "data": data}))
}

pub async fn debug(State(state): State<AppState>) -> Json<Value> {
    let statuses = state.deployments.artifact_status();
    let errors: Vec<String> = statuses
        .iter()
        .filter(|(_, status)| !status.exists)
        .map(|(contract_type, _)| {
            format!(
                "Contract {} not compiled: {}",
                contract_type,
                contract_type.artifact_file()
            )
        })
        .collect();
    let compiled: Map<String, Value> = statuses
        .into_iter()
        .map(|(contract_type, status)| {
            (
                contract_type.as_str().to_string(),
                serde_json::to_value(status).unwrap_or(Value::Null),
            )
        })
        .collect();
    Json(json!({"compiledContracts": compiled, "errors": errors}))
}

pub async fn get_simple(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let found = state
        .stores
        .simple()
        .get()
        .await
        .map_err(|e| ApiError::from(e).during("get_value"))?;
    Ok(Json(json!({
        "success": true,
        "value": found.value.to_dec_string(),
        "contractAddress": address_hex(&found.contract_address),
    })))
}

pub async fn set_simple(State(state): State<AppState>, body: String) -> Result<Json<Value>, ApiError> {
    let request: SetValueRequest = parse_body(&body)?;
    let key = state.signing_key(request.private_key.as_deref())?;
    let value = request
        .value
        .ok_or_else(|| ApiError::bad_request("value required"))?;

    let outcome = state
        .stores
        .simple()
        .set(value, &key)
        .await
        .map_err(|e| ApiError::from(e).during("set_value"))?;
    Ok(Json(json!({
        "success": true,
        "operation": "set_value",
        "value": outcome.value.to_dec_string(),
        "contractAddress": address_hex(&outcome.contract_address),
        "transactionHash": hash_hex(&outcome.receipt.transaction_hash),
        "blockNumber": outcome.receipt.block_number,
        "blockHash": hash_hex(&outcome.receipt.block_hash),
        "gasUsed": outcome.receipt.gas_used,
        "timestamp": now_iso(),
    })))
}

pub async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    not_found_error(method.as_str(), uri.path(), now_iso())
}
