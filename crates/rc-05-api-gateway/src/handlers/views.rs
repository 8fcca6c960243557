//! Entity-specific filter routes.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use rc_04_record_store::filters::parse_enabled;
use rc_04_record_store::{RecordList, RecordSchema, StoreError};
use serde_json::{json, Value};
use shared_types::{address_hex, ContractType};

use crate::domain::error::ApiError;

use super::records::{list_body, EntityState};

/// Adds the filter routes that exist for `schema`'s entity.
pub fn extend(schema: &RecordSchema, router: Router<EntityState>) -> Router<EntityState> {
    match schema.contract_type {
        ContractType::User => router
            .route("/role/:role", get(users_by_role))
            .route("/type/:user_type", get(users_by_type))
            .route("/status/:enabled", get(users_by_status)),
        ContractType::Company => router.route("/:id/financial", get(company_financial)),
        ContractType::Attendance => router
            .route("/employee/:employee_id", get(attendances_by_employee))
            .route("/date/:start/:end", get(attendances_by_date)),
        _ => router,
    }
}

fn respond(
    state: &EntityState,
    list: Result<RecordList, StoreError>,
    operation: &str,
    echo: &[(&str, Value)],
) -> Result<Json<Value>, ApiError> {
    let list = list.map_err(|e| ApiError::from(e).during(operation))?;
    let mut body = list_body(&state.schema.collection(), &list)?;
    for (key, value) in echo {
        body.insert((*key).to_string(), value.clone());
    }
    Ok(Json(Value::Object(body)))
}

async fn users_by_role(
    State(state): State<EntityState>,
    Path(role): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let list = state.app.stores.users_by_role(&role).await;
    respond(&state, list, "get_users_by_role", &[("role", json!(role))])
}

async fn users_by_type(
    State(state): State<EntityState>,
    Path(user_type): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let list = state.app.stores.users_by_type(&user_type).await;
    respond(&state, list, "get_users_by_type", &[("userType", json!(user_type))])
}

async fn users_by_status(
    State(state): State<EntityState>,
    Path(enabled): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let flag = parse_enabled(&enabled).ok_or_else(|| {
        ApiError::bad_request(format!(
            "enabled must be one of true, false, 1, 0; got '{}'",
            enabled
        ))
    })?;
    let list = state.app.stores.users_by_status(flag).await;
    respond(&state, list, "get_users_by_status", &[("enabled", json!(flag))])
}

async fn attendances_by_employee(
    State(state): State<EntityState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let list = state.app.stores.attendances_by_employee(&employee_id).await;
    respond(
        &state,
        list,
        "get_employee_attendances",
        &[("employeeId", json!(employee_id))],
    )
}

async fn attendances_by_date(
    State(state): State<EntityState>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let list = state.app.stores.attendances_by_date(&start, &end).await;
    respond(
        &state,
        list,
        "get_date_range_attendances",
        &[("dateRange", json!({"startDate": start, "endDate": end}))],
    )
}

async fn company_financial(
    State(state): State<EntityState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let financial = state
        .app
        .stores
        .company_financial(&id)
        .await
        .map_err(|e| ApiError::from(e).during("get_company_financial"))?;
    Ok(Json(json!({
        "success": true,
        "recordId": id,
        "financialInfo": financial.value,
        "blockchain": {
            "contractAddress": address_hex(&financial.contract_address),
            "contractType": ContractType::Company.contract_name(),
        },
    })))
}
