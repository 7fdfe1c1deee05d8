//! Deployer that logs what it would do instead of touching a platform.

use appbroker_core::{DeployerClient, Result};
use appbroker_types::{BackingApplication, BackingService};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// One deployer call made during a dry run.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunCall {
    pub action: &'static str,
    pub name: String,
    pub id: String,
}

/// Records every call and answers with a fresh id.
#[derive(Debug, Default)]
pub struct DryRunDeployer {
    calls: Mutex<Vec<DryRunCall>>,
}

impl DryRunDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far, in completion order.
    pub fn calls(&self) -> Vec<DryRunCall> {
        self.calls.lock().clone()
    }

    fn record(&self, action: &'static str, name: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        info!(action, name, id = %id, "Dry-run deployer call");
        self.calls.lock().push(DryRunCall {
            action,
            name: name.to_string(),
            id: id.clone(),
        });
        Ok(id)
    }
}

#[async_trait]
impl DeployerClient for DryRunDeployer {
    async fn create_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("create_service_instance", &service.service_instance_name)
    }

    async fn update_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("update_service_instance", &service.service_instance_name)
    }

    async fn delete_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("delete_service_instance", &service.service_instance_name)
    }

    async fn deploy_application(&self, application: BackingApplication) -> Result<String> {
        self.record("deploy_application", &application.name)
    }

    async fn update_application(&self, application: BackingApplication) -> Result<String> {
        self.record("update_application", &application.name)
    }

    async fn undeploy_application(&self, application: BackingApplication) -> Result<String> {
        self.record("undeploy_application", &application.name)
    }
}
