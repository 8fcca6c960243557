//! # Record Schemas
//!
//! The five entity contracts differ only in names. One descriptor per type
//! yields every contract method and HTTP name the store and gateway need.
//!
//! | Type | Entity | Plural | Collection | Body key |
//! |---|---|---|---|---|
//! | employee | Employee | Employees | `employees` | `employeeData` |
//! | user | User | Users | `users` | `userData` |
//! | task | Task | Tasks | `tasks` | `taskData` |
//! | company | Company | Companies | `companies` | `companyData` |
//! | attendance | Attendance | Attendances | `attendances` | `attendanceData` |

use shared_types::ContractType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordSchema {
    pub contract_type: ContractType,
    pub entity: &'static str,
    pub plural: &'static str,
}

const SCHEMAS: [RecordSchema; 5] = [
    RecordSchema {
        contract_type: ContractType::Employee,
        entity: "Employee",
        plural: "Employees",
    },
    RecordSchema {
        contract_type: ContractType::User,
        entity: "User",
        plural: "Users",
    },
    RecordSchema {
        contract_type: ContractType::Task,
        entity: "Task",
        plural: "Tasks",
    },
    RecordSchema {
        contract_type: ContractType::Company,
        entity: "Company",
        plural: "Companies",
    },
    RecordSchema {
        contract_type: ContractType::Attendance,
        entity: "Attendance",
        plural: "Attendances",
    },
];

impl RecordSchema {
    pub fn all() -> &'static [RecordSchema] {
        &SCHEMAS
    }

    /// `None` for the simple value contract.
    pub fn for_type(contract_type: ContractType) -> Option<RecordSchema> {
        SCHEMAS
            .iter()
            .copied()
            .find(|schema| schema.contract_type == contract_type)
    }

    pub fn store_method(&self) -> String {
        format!("store{}", self.entity)
    }

    pub fn get_method(&self) -> String {
        format!("get{}", self.entity)
    }

    pub fn metadata_method(&self) -> String {
        format!("get{}Metadata", self.entity)
    }

    pub fn exists_method(&self) -> String {
        format!("does{}Exist", self.entity)
    }

    pub fn total_method(&self) -> String {
        format!("getTotal{}", self.plural)
    }

    pub fn ids_method(&self) -> String {
        format!("getAll{}Ids", self.entity)
    }

    /// URL segment and list key, e.g. `companies`.
    pub fn collection(&self) -> String {
        self.plural.to_lowercase()
    }

    /// Request body key holding the record, e.g. `companyData`.
    pub fn body_key(&self) -> String {
        format!("{}Data", self.entity.to_lowercase())
    }

    /// `store_company`
    pub fn store_operation(&self) -> String {
        format!("store_{}", self.entity.to_lowercase())
    }
}
