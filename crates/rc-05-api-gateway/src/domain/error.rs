//! # HTTP Errors
//!
//! Every failure leaves a handler as an [`ApiError`]: a status plus the
//! message of the underlying error, rendered as `{"error": message}`.
//!
//! | Cause | Status |
//! |---|---|
//! | Bad key, address, timestamp, argument, missing field, unknown type | 400 |
//! | Record not found, contract not deployed | 404 |
//! | Chain, pipeline, artifact, registry and decode failures | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rc_01_transaction_pipeline::{PipelineError, RpcError};
use rc_02_record_codec::CodecError;
use rc_03_deployment_manager::DeploymentError;
use rc_04_record_store::StoreError;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Failure rendered as a JSON HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Operation name echoed on server errors, e.g. `list_users`
    pub operation: Option<String>,
    /// Extra top-level fields merged into the body
    pub extra: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            operation: None,
            extra: Map::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Tags server errors with the operation that failed.
    pub fn during(mut self, operation: impl Into<String>) -> Self {
        if self.status.is_server_error() {
            self.operation = Some(operation.into());
        }
        self
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".into(), Value::String(self.message));
        if let Some(operation) = self.operation {
            body.insert("operation".into(), Value::String(operation));
        }
        body.extend(self.extra);
        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            Self::bad_request(err.to_string())
        } else {
            Self::internal(err.to_string())
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::DecodeError(_) => Self::internal(err.to_string()),
            CodecError::InvalidTimestamp(_)
            | CodecError::InvalidArgument(_)
            | CodecError::UnsupportedType(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<DeploymentError> for ApiError {
    fn from(err: DeploymentError) -> Self {
        match err {
            DeploymentError::UnknownContractType(_) => Self::bad_request(err.to_string()),
            DeploymentError::NotDeployed(_) => Self::not_found(err.to_string()),
            DeploymentError::Pipeline(e) => e.into(),
            DeploymentError::Codec(e) => e.into(),
            DeploymentError::ArtifactNotFound { .. }
            | DeploymentError::ArtifactInvalid(_)
            | DeploymentError::DeploymentReverted(_)
            | DeploymentError::Registry(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::MissingRecordId(_) => Self::bad_request(err.to_string()),
            StoreError::Call(e) => e.into(),
            StoreError::Deployment(e) => e.into(),
            StoreError::Pipeline(e) => e.into(),
            StoreError::Codec(e) => e.into(),
        }
    }
}

/// Server lifecycle errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    #[error("server error: {0}")]
    Server(String),
}

/// `{"error": "Route not found: GET /x", "timestamp": ...}`
pub fn route_not_found(method: &str, path: &str, timestamp: String) -> ApiError {
    ApiError::not_found(format!("Route not found: {} {}", method, path))
        .with_field("timestamp", json!(timestamp))
}
