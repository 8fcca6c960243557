//! Entity-specific read views. Each is a full `list()` narrowed in memory.

use rc_03_deployment_manager::DeploymentError;
use serde_json::{Map, Value};
use shared_types::ContractType;

use crate::domain::errors::StoreError;
use crate::domain::filters;
use crate::domain::outcome::{Located, RecordList};
use crate::service::{RecordStore, RecordStores};

impl RecordStores {
    fn require(&self, contract_type: ContractType) -> Result<std::sync::Arc<RecordStore>, StoreError> {
        self.get(contract_type).ok_or_else(|| {
            StoreError::Deployment(DeploymentError::UnknownContractType(
                contract_type.as_str().to_string(),
            ))
        })
    }

    pub async fn users_by_role(&self, role: &str) -> Result<RecordList, StoreError> {
        self.require(ContractType::User)?
            .filter(|record| filters::has_role(record, role))
            .await
    }

    pub async fn users_by_type(&self, user_type: &str) -> Result<RecordList, StoreError> {
        self.require(ContractType::User)?
            .filter(|record| filters::has_user_type(record, user_type))
            .await
    }

    pub async fn users_by_status(&self, enabled: bool) -> Result<RecordList, StoreError> {
        self.require(ContractType::User)?
            .filter(|record| filters::has_enabled(record, enabled))
            .await
    }

    pub async fn attendances_by_employee(&self, employee_id: &str) -> Result<RecordList, StoreError> {
        self.require(ContractType::Attendance)?
            .filter(|record| filters::for_employee(record, employee_id))
            .await
    }

    /// Inclusive on both ends.
    pub async fn attendances_by_date(&self, start: &str, end: &str) -> Result<RecordList, StoreError> {
        self.require(ContractType::Attendance)?
            .filter(|record| filters::in_date_range(record, start, end))
            .await
    }

    pub async fn company_financial(
        &self,
        company_id: &str,
    ) -> Result<Located<Map<String, Value>>, StoreError> {
        let company = self.require(ContractType::Company)?.get(company_id).await?;
        Ok(Located {
            value: filters::financial_info(&company.value),
            contract_address: company.contract_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::service::StoreContext;
    use crate::test_utils::StorageContractHost;
    use crate::RecordStores;
    use rc_01_transaction_pipeline::test_utils::MockChain;
    use rc_01_transaction_pipeline::{
        PipelineConfig, SystemTimeSource, TransactionPipeline, TransactionSubmitter,
    };
    use rc_02_record_codec::RecordInput;
    use rc_03_deployment_manager::test_utils::write_artifacts;
    use rc_03_deployment_manager::{
        ArtifactDirectory, DeploymentConfig, DeploymentManager, DeploymentRegistry,
        MemoryRegistry,
    };
    use serde_json::{json, Value};
    use shared_types::ContractType;
    use std::sync::Arc;
    use std::time::Duration;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    async fn seeded(ty: ContractType, rows: Vec<(&str, Value)>) -> (RecordStores, tempfile::TempDir) {
        let chain = Arc::new(MockChain::new(1337).with_host(StorageContractHost::new()));
        let pipeline: Arc<dyn TransactionSubmitter> = Arc::new(TransactionPipeline::new(
            chain.clone(),
            PipelineConfig {
                receipt_poll_interval: Duration::from_millis(1),
                ..PipelineConfig::default()
            },
        ));
        let registry: Arc<dyn DeploymentRegistry> = Arc::new(MemoryRegistry::new());
        let artifacts = tempfile::tempdir().unwrap();
        write_artifacts(artifacts.path()).unwrap();
        DeploymentManager::new(
            pipeline.clone(),
            Arc::new(ArtifactDirectory::new(artifacts.path())),
            registry.clone(),
            Arc::new(SystemTimeSource),
            DeploymentConfig::default(),
        )
        .deploy(ty, None, KEY)
        .await
        .unwrap();

        let stores = RecordStores::new(StoreContext {
            rpc: chain,
            submitter: pipeline,
            registry,
        });
        let store = stores.get(ty).unwrap();
        for (id, data) in rows {
            let input: RecordInput = serde_json::from_value(json!({
                "recordId": id,
                "createdTimestamp": 1_704_067_200u64,
                "modifiedTimestamp": 1_704_067_200u64,
                "modifiedBy": "seed",
                "allData": data
            }))
            .unwrap();
            store.store(input, KEY).await.unwrap();
        }
        (stores, artifacts)
    }

    fn ids(list: &crate::RecordList) -> Vec<&str> {
        list.records.iter().map(|r| r.record_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_user_views() {
        let (stores, _dir) = seeded(
            ContractType::User,
            vec![
                ("U-1", json!({"role": "admin", "user_type": "System User", "enabled": 1})),
                ("U-2", json!({"roles": [{"role": "admin"}], "enabled": false})),
                ("U-3", json!({"roles": ["viewer"], "user_type": "Website User", "enabled": "true"})),
            ],
        )
        .await;

        assert_eq!(ids(&stores.users_by_role("admin").await.unwrap()), vec!["U-1", "U-2"]);
        assert_eq!(ids(&stores.users_by_type("Website User").await.unwrap()), vec!["U-3"]);
        assert_eq!(ids(&stores.users_by_status(true).await.unwrap()), vec!["U-1", "U-3"]);
        assert_eq!(ids(&stores.users_by_status(false).await.unwrap()), vec!["U-2"]);
    }

    #[tokio::test]
    async fn test_attendance_views() {
        let (stores, _dir) = seeded(
            ContractType::Attendance,
            vec![
                ("A-1", json!({"employee": "E-1", "attendance_date": "2024-01-05"})),
                ("A-2", json!({"employee": "E-2", "attendance_date": "2024-01-10"})),
                ("A-3", json!({"employee": "E-1", "attendance_date": "2024-02-01"})),
            ],
        )
        .await;

        assert_eq!(ids(&stores.attendances_by_employee("E-1").await.unwrap()), vec!["A-1", "A-3"]);
        let january = stores
            .attendances_by_date("2024-01-05", "2024-01-31")
            .await
            .unwrap();
        assert_eq!(ids(&january), vec!["A-1", "A-2"]);
    }

    #[tokio::test]
    async fn test_company_financial_projects_fields() {
        let (stores, _dir) = seeded(
            ContractType::Company,
            vec![("C-1", json!({"default_currency": "USD", "credit_limit": 5000, "name": "Acme"}))],
        )
        .await;

        let financial = stores.company_financial("C-1").await.unwrap().value;
        assert_eq!(financial.len(), 10);
        assert_eq!(financial["default_currency"], "USD");
        assert_eq!(financial["credit_limit"], 5000);
        assert_eq!(financial["cost_center"], Value::Null);
        assert!(!financial.contains_key("name"));
        assert!(stores.company_financial("C-404").await.is_err());
    }
}
