//! # Contract Artifacts
//!
//! A compiled contract is a JSON document with an `abi` array and creation
//! `bytecode`. The bytecode may be a plain hex string or a solc-style
//! `{"object": "..."}` wrapper, with or without `0x`.

use rc_02_record_codec::abi::{encode, tokenize_all, ParamType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::DeploymentError;

/// One parameter of an ABI entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Resolves `tuple` kinds through their components.
    pub fn param_type(&self) -> Result<ParamType, DeploymentError> {
        if let Some(suffix) = self.kind.strip_prefix("tuple") {
            let members = self
                .components
                .iter()
                .map(AbiParam::param_type)
                .collect::<Result<Vec<_>, _>>()?;
            let mut ty = ParamType::Tuple(members);
            let mut rest = suffix;
            while let Some(next) = rest.strip_prefix("[]") {
                ty = ParamType::Array(Box::new(ty));
                rest = next;
            }
            if !rest.is_empty() {
                return Err(DeploymentError::ArtifactInvalid(format!(
                    "unsupported parameter type {}",
                    self.kind
                )));
            }
            return Ok(ty);
        }
        Ok(ParamType::parse(&self.kind)?)
    }
}

/// One entry of a contract ABI (function, constructor, event...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default = "default_entry_kind")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
}

fn default_entry_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    pub abi: Vec<AbiEntry>,
    pub bytecode: Vec<u8>,
}

impl ContractArtifact {
    /// Validates an artifact document.
    pub fn from_json(document: &Value) -> Result<Self, DeploymentError> {
        let abi = document
            .get("abi")
            .filter(|abi| abi.is_array())
            .ok_or_else(|| DeploymentError::ArtifactInvalid("missing abi".into()))?;
        let abi: Vec<AbiEntry> = serde_json::from_value(abi.clone())
            .map_err(|e| DeploymentError::ArtifactInvalid(format!("abi: {}", e)))?;

        let bytecode = bytecode_hex(document)
            .ok_or_else(|| DeploymentError::ArtifactInvalid("missing bytecode".into()))?;
        let bytecode = hex::decode(bytecode.strip_prefix("0x").unwrap_or(bytecode))
            .map_err(|e| DeploymentError::ArtifactInvalid(format!("bytecode: {}", e)))?;
        if bytecode.is_empty() {
            return Err(DeploymentError::ArtifactInvalid("empty bytecode".into()));
        }

        Ok(Self { abi, bytecode })
    }

    pub fn constructor_inputs(&self) -> Result<Vec<ParamType>, DeploymentError> {
        self.abi
            .iter()
            .find(|entry| entry.kind == "constructor")
            .map(|entry| entry.inputs.iter().map(AbiParam::param_type).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    pub fn function_count(&self) -> usize {
        self.abi.iter().filter(|entry| entry.kind == "function").count()
    }

    /// `bytecode ++ abi_encode(constructor inputs, args)`.
    pub fn creation_code(&self, args: &[Value]) -> Result<Vec<u8>, DeploymentError> {
        let inputs = self.constructor_inputs()?;
        let tokens = tokenize_all(&inputs, args)?;
        let mut code = self.bytecode.clone();
        code.extend(encode(&tokens));
        Ok(code)
    }
}

fn bytecode_hex(document: &Value) -> Option<&str> {
    match document.get("bytecode")? {
        Value::String(code) => Some(code.as_str()),
        Value::Object(wrapper) => wrapper.get("object").and_then(Value::as_str),
        _ => None,
    }
    .filter(|code| !code.is_empty() && *code != "0x")
}

/// What `GET /debug` reports for one contract type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStatus {
    pub exists: bool,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "hasABI")]
    pub has_abi: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_bytecode: Option<bool>,
    /// Creation code size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytecode_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abi_methods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArtifactStatus {
    pub fn missing(file: String) -> Self {
        Self {
            exists: false,
            file,
            ..Self::default()
        }
    }

    /// Inspects a parsed document without requiring it to be deployable.
    pub fn inspect(file: String, document: &Value) -> Self {
        let abi = document.get("abi").and_then(Value::as_array);
        let bytecode = bytecode_hex(document);
        Self {
            exists: true,
            file,
            has_abi: Some(abi.is_some()),
            has_bytecode: Some(bytecode.is_some()),
            bytecode_length: Some(
                bytecode.map_or(0, |code| code.strip_prefix("0x").unwrap_or(code).len() / 2),
            ),
            abi_methods: Some(abi.map_or(0, |entries| {
                entries
                    .iter()
                    .filter(|entry| entry.get("type").and_then(Value::as_str) == Some("function"))
                    .count()
            })),
            error: None,
        }
    }

    pub fn unreadable(file: String, error: String) -> Self {
        Self {
            exists: true,
            file,
            error: Some(error),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn simple_storage() -> Value {
        json!({
            "abi": [
                {"type": "constructor", "inputs": [{"name": "initial", "type": "uint256"}]},
                {"type": "function", "name": "get", "inputs": []},
                {"type": "function", "name": "set", "inputs": [{"name": "x", "type": "uint256"}]}
            ],
            "bytecode": "0x6080"
        })
    }

    #[test]
    fn test_creation_code_appends_constructor_args() {
        let artifact = ContractArtifact::from_json(&simple_storage()).unwrap();
        let code = artifact.creation_code(&[json!(123)]).unwrap();
        assert_eq!(&code[..2], &[0x60, 0x80]);
        assert_eq!(code.len(), 2 + 32);
        assert_eq!(code[33], 123);
        assert_eq!(artifact.function_count(), 2);
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let artifact = ContractArtifact::from_json(&simple_storage()).unwrap();
        let err = artifact.creation_code(&[]).unwrap_err();
        assert!(matches!(err, DeploymentError::Codec(_)));
    }

    #[test]
    fn test_no_constructor_means_no_args() {
        let artifact = ContractArtifact::from_json(&json!({
            "abi": [],
            "bytecode": {"object": "6080"}
        }))
        .unwrap();
        assert_eq!(artifact.creation_code(&[]).unwrap(), vec![0x60, 0x80]);
    }

    #[test]
    fn test_missing_parts_are_invalid() {
        for doc in [
            json!({"bytecode": "0x6080"}),
            json!({"abi": [], "bytecode": "0x"}),
            json!({"abi": []}),
            json!({"abi": {}, "bytecode": "0x6080"}),
            json!({"abi": [], "bytecode": "0xzz"}),
        ] {
            assert!(matches!(
                ContractArtifact::from_json(&doc),
                Err(DeploymentError::ArtifactInvalid(_))
            ));
        }
    }

    #[test]
    fn test_tuple_params_resolve_through_components() {
        let param: AbiParam = serde_json::from_value(json!({
            "name": "r",
            "type": "tuple[]",
            "components": [{"name": "a", "type": "string"}, {"name": "b", "type": "uint256"}]
        }))
        .unwrap();
        assert_eq!(
            param.param_type().unwrap(),
            ParamType::Array(Box::new(ParamType::Tuple(vec![
                ParamType::String,
                ParamType::Uint(256)
            ])))
        );
    }

    #[test]
    fn test_status_inspection() {
        let status = ArtifactStatus::inspect("SimpleStorage.json".into(), &simple_storage());
        assert_eq!(status.has_abi, Some(true));
        assert_eq!(status.bytecode_length, Some(2));
        assert_eq!(status.abi_methods, Some(2));
        let json = serde_json::to_value(ArtifactStatus::missing("x.json".into())).unwrap();
        assert_eq!(json, json!({"exists": false, "file": "x.json"}));
    }
}
