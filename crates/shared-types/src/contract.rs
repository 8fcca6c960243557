//! # Contract Catalogue
//!
//! The six contract types the gateway knows how to deploy and talk to. Every
//! deployment file, artifact lookup and record store is keyed by one of these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TypeError;

/// Gas limit for deploying `SimpleStorage`.
pub const SIMPLE_DEPLOY_GAS_LIMIT: u64 = 5_000_000;

/// Gas limit for deploying any of the record storage contracts.
pub const RECORD_DEPLOY_GAS_LIMIT: u64 = 8_000_000;

/// A deployable contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractType {
    Simple,
    Employee,
    User,
    Task,
    Company,
    Attendance,
}

impl ContractType {
    /// Catalogue order, used for listings.
    pub const ALL: [ContractType; 6] = [
        ContractType::Simple,
        ContractType::Employee,
        ContractType::User,
        ContractType::Task,
        ContractType::Company,
        ContractType::Attendance,
    ];

    /// The five record-keeping contract types.
    pub const RECORDS: [ContractType; 5] = [
        ContractType::Employee,
        ContractType::User,
        ContractType::Task,
        ContractType::Company,
        ContractType::Attendance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Simple => "simple",
            ContractType::Employee => "employee",
            ContractType::User => "user",
            ContractType::Task => "task",
            ContractType::Company => "company",
            ContractType::Attendance => "attendance",
        }
    }

    /// Solidity contract name.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractType::Simple => "SimpleStorage",
            ContractType::Employee => "EmployeeStorage",
            ContractType::User => "UserStorage",
            ContractType::Task => "TaskStorage",
            ContractType::Company => "CompanyStorage",
            ContractType::Attendance => "AttendanceStorage",
        }
    }

    /// Compiled artifact file name (`{abi, bytecode}` JSON).
    pub fn artifact_file(&self) -> String {
        format!("{}.json", self.contract_name())
    }

    /// Deployment record file name.
    pub fn deployment_file(&self) -> String {
        format!("contract-deployment-{}.json", self.as_str())
    }

    /// Constructor arguments used when a deploy request supplies none.
    pub fn default_constructor_args(&self) -> Vec<serde_json::Value> {
        match self {
            ContractType::Simple => vec![serde_json::Value::from(123u64)],
            _ => Vec::new(),
        }
    }

    pub fn deploy_gas_limit(&self) -> u64 {
        match self {
            ContractType::Simple => SIMPLE_DEPLOY_GAS_LIMIT,
            _ => RECORD_DEPLOY_GAS_LIMIT,
        }
    }

    pub fn is_record_store(&self) -> bool {
        !matches!(self, ContractType::Simple)
    }

    /// Comma separated list of every type, for error messages.
    pub fn catalogue() -> String {
        Self::ALL
            .iter()
            .map(ContractType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypeError::UnknownContractType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_type_round_trips_through_str() {
        for ty in ContractType::ALL {
            assert_eq!(ty.as_str().parse::<ContractType>().unwrap(), ty);
        }
        assert!("ledger".parse::<ContractType>().is_err());
        assert!("Employee".parse::<ContractType>().is_err());
    }

    #[test]
    fn test_catalogue_entries() {
        assert_eq!(ContractType::Simple.artifact_file(), "SimpleStorage.json");
        assert_eq!(
            ContractType::Attendance.deployment_file(),
            "contract-deployment-attendance.json"
        );
        assert_eq!(ContractType::Simple.default_constructor_args(), vec![serde_json::json!(123)]);
        assert!(ContractType::Company.default_constructor_args().is_empty());
        assert_eq!(ContractType::Simple.deploy_gas_limit(), 5_000_000);
        assert_eq!(ContractType::Task.deploy_gas_limit(), 8_000_000);
        assert!(!ContractType::Simple.is_record_store());
        assert_eq!(
            ContractType::catalogue(),
            "simple, employee, user, task, company, attendance"
        );
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ContractType::Company).unwrap();
        assert_eq!(json, "\"company\"");
        let parsed: ContractType = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, ContractType::User);
    }
}
