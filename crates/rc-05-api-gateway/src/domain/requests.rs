//! Request bodies. Bodies are parsed by hand so malformed JSON yields the
//! gateway's own `{"error": ...}` shape rather than axum's plain-text
//! rejection.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared_types::U256;

use super::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub private_key: Option<String>,
    pub contract_type: Option<String>,
    pub constructor_args: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetValueRequest {
    pub private_key: Option<String>,
    pub value: Option<U256>,
}

/// An empty body reads as `{}`.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body() {
        let req: DeployRequest =
            parse_body(r#"{"privateKey":"0xab","contractType":"simple","constructorArgs":[7]}"#)
                .unwrap();
        assert_eq!(req.contract_type.as_deref(), Some("simple"));
        assert_eq!(req.constructor_args, Some(vec![Value::from(7)]));

        let req: SetValueRequest = parse_body("").unwrap();
        assert!(req.value.is_none());
        let req: SetValueRequest = parse_body(r#"{"value":"42"}"#).unwrap();
        assert_eq!(req.value, Some(U256::from(42u64)));

        let err = parse_body::<SetValueRequest>("{oops").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
