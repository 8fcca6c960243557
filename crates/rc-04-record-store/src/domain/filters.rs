//! # Record Filters
//!
//! Predicates over decoded records, applied in memory after a full list.
//! Records whose payload is not a JSON object never match.

use rc_02_record_codec::Record;
use serde_json::{Map, Value};

/// Company payload keys exposed by the financial view.
pub const FINANCIAL_FIELDS: [&str; 10] = [
    "default_currency",
    "monthly_sales_target",
    "total_monthly_sales",
    "credit_limit",
    "round_off_account",
    "default_income_account",
    "default_expense_account",
    "default_cash_account",
    "default_bank_account",
    "cost_center",
];

/// `allData.role == role`, or `role` appears in `allData.roles` either as a
/// string entry or as the `.role` of an object entry.
pub fn has_role(record: &Record, role: &str) -> bool {
    if record.all_data.field("role").and_then(Value::as_str) == Some(role) {
        return true;
    }
    record
        .all_data
        .field("roles")
        .and_then(Value::as_array)
        .is_some_and(|roles| {
            roles.iter().any(|entry| match entry {
                Value::String(name) => name == role,
                Value::Object(obj) => obj.get("role").and_then(Value::as_str) == Some(role),
                _ => false,
            })
        })
}

pub fn has_user_type(record: &Record, user_type: &str) -> bool {
    record.all_data.field("user_type").and_then(Value::as_str) == Some(user_type)
}

/// Parses the `:enabled` path segment.
pub fn parse_enabled(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Truthiness of `allData.enabled`: `true`, a non-zero number, or the
/// strings `"true"`/`"1"`. Anything else, absence included, is false.
pub fn is_enabled(record: &Record) -> bool {
    match record.all_data.field("enabled") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => s == "true" || s == "1",
        _ => false,
    }
}

pub fn has_enabled(record: &Record, enabled: bool) -> bool {
    is_enabled(record) == enabled
}

pub fn for_employee(record: &Record, employee_id: &str) -> bool {
    record.all_data.field("employee").and_then(Value::as_str) == Some(employee_id)
}

/// `start <= allData.attendance_date <= end`, compared as strings, which
/// orders `YYYY-MM-DD` dates chronologically.
pub fn in_date_range(record: &Record, start: &str, end: &str) -> bool {
    record
        .all_data
        .field("attendance_date")
        .and_then(Value::as_str)
        .is_some_and(|date| start <= date && date <= end)
}

/// Projects [`FINANCIAL_FIELDS`]; absent keys become `null`.
pub fn financial_info(record: &Record) -> Map<String, Value> {
    FINANCIAL_FIELDS
        .iter()
        .map(|key| {
            let value = record.all_data.field(key).cloned().unwrap_or(Value::Null);
            (key.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_02_record_codec::RecordPayload;
    use serde_json::json;

    fn record(data: Value) -> Record {
        Record {
            record_id: "r".into(),
            created_timestamp: 0,
            modified_timestamp: 0,
            modified_by: "t".into(),
            all_data: RecordPayload::Json(data),
        }
    }

    #[test]
    fn test_role_matches_all_shapes() {
        assert!(has_role(&record(json!({"role": "admin"})), "admin"));
        assert!(has_role(&record(json!({"roles": ["viewer", "admin"]})), "admin"));
        assert!(has_role(&record(json!({"roles": [{"role": "admin"}]})), "admin"));
        assert!(!has_role(&record(json!({"roles": [{"name": "admin"}]})), "admin"));
        assert!(!has_role(&record(json!({"role": "Admin"})), "admin"));
        let raw = Record {
            all_data: RecordPayload::Raw("role=admin".into()),
            ..record(json!(null))
        };
        assert!(!has_role(&raw, "admin"));
    }

    #[test]
    fn test_user_type() {
        assert!(has_user_type(&record(json!({"user_type": "System User"})), "System User"));
        assert!(!has_user_type(&record(json!({})), "System User"));
    }

    #[test]
    fn test_enabled_parsing_and_truthiness() {
        assert_eq!(parse_enabled("1"), Some(true));
        assert_eq!(parse_enabled("false"), Some(false));
        assert_eq!(parse_enabled("yes"), None);

        assert!(is_enabled(&record(json!({"enabled": true}))));
        assert!(is_enabled(&record(json!({"enabled": 1}))));
        assert!(is_enabled(&record(json!({"enabled": "1"}))));
        assert!(!is_enabled(&record(json!({"enabled": 0}))));
        assert!(!is_enabled(&record(json!({"enabled": "no"}))));
        assert!(!is_enabled(&record(json!({}))));
        assert!(has_enabled(&record(json!({})), false));
    }

    #[test]
    fn test_attendance_filters() {
        let r = record(json!({"employee": "EMP-1", "attendance_date": "2024-03-15"}));
        assert!(for_employee(&r, "EMP-1"));
        assert!(!for_employee(&r, "EMP-2"));
        assert!(in_date_range(&r, "2024-03-01", "2024-03-31"));
        assert!(in_date_range(&r, "2024-03-15", "2024-03-15"));
        assert!(!in_date_range(&r, "2024-04-01", "2024-04-30"));
        assert!(!in_date_range(&record(json!({})), "0000", "9999"));
    }

    #[test]
    fn test_financial_projection_fills_nulls() {
        let info = financial_info(&record(json!({
            "default_currency": "USD",
            "credit_limit": 5000,
            "company_name": "Acme"
        })));
        assert_eq!(info.len(), 10);
        assert_eq!(info["default_currency"], "USD");
        assert_eq!(info["credit_limit"], 5000);
        assert_eq!(info["cost_center"], Value::Null);
        assert!(!info.contains_key("company_name"));
    }
}
