//! Artifact fixtures for tests that deploy against `MockChain`.

use serde_json::{json, Value};
use shared_types::ContractType;
use std::path::Path;

/// Placeholder creation code; the mock chain never executes it.
pub const FIXTURE_BYTECODE: &str = "0x6080";

/// Artifact document for `contract_type` with the real constructor shape.
pub fn artifact_json(contract_type: ContractType) -> Value {
    let mut abi = vec![];
    if contract_type == ContractType::Simple {
        abi.push(json!({
            "type": "constructor",
            "inputs": [{"name": "initialValue", "type": "uint256"}]
        }));
        abi.push(json!({"type": "function", "name": "get", "inputs": []}));
        abi.push(json!({
            "type": "function",
            "name": "set",
            "inputs": [{"name": "x", "type": "uint256"}]
        }));
    } else {
        let name = contract_type.contract_name().trim_end_matches("Storage");
        for method in ["store", "get", "does", "getTotal", "getAll"] {
            abi.push(json!({"type": "function", "name": format!("{}{}", method, name), "inputs": []}));
        }
    }
    json!({"abi": abi, "bytecode": FIXTURE_BYTECODE})
}

/// Writes every artifact into `dir`.
pub fn write_artifacts(dir: &Path) -> std::io::Result<()> {
    for contract_type in ContractType::ALL {
        std::fs::write(
            dir.join(contract_type.artifact_file()),
            artifact_json(contract_type).to_string(),
        )?;
    }
    Ok(())
}
