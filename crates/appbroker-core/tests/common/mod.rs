//! Recording collaborators shared by the integration tests.
//!
//! Every collaborator appends to one [`CallLog`], so a test can assert the
//! exact order in which a workflow drove them.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use appbroker_core::{
    BackingAppDeploymentService, BackingServicesProvisionService, BrokerError,
    CredentialProviderService, DeployerClient, ParametersTransformationService, Result,
    TargetService, TransformerRegistry,
};
use appbroker_types::{
    BackingApplication, BackingApplications, BackingService, BackingServices, Plan,
    ServiceDefinition, TargetSpec,
};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Position of the first entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> usize {
        let entries = self.entries();
        entries
            .iter()
            .position(|entry| entry.starts_with(prefix))
            .unwrap_or_else(|| panic!("no call starting with {prefix:?} in {entries:?}"))
    }
}

/// Deployer whose service calls finish after a short delay.
pub struct RecordingDeployer {
    log: CallLog,
    failing: HashSet<String>,
    delay: Duration,
}

impl RecordingDeployer {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            failing: HashSet::new(),
            delay: Duration::from_millis(20),
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    async fn call(&self, method: &str, name: &str, delay: bool) -> Result<String> {
        if delay {
            tokio::time::sleep(self.delay).await;
        }
        self.log.push(format!("deployer.{method} {name}"));
        if self.failing.contains(name) {
            return Err(BrokerError::Deployer(format!("{method} failed for {name}")));
        }
        Ok(format!("{name}-id"))
    }
}

#[async_trait]
impl DeployerClient for RecordingDeployer {
    async fn create_service_instance(&self, service: BackingService) -> Result<String> {
        self.call("create_service_instance", &service.service_instance_name, true)
            .await
    }

    async fn update_service_instance(&self, service: BackingService) -> Result<String> {
        self.call("update_service_instance", &service.service_instance_name, true)
            .await
    }

    async fn delete_service_instance(&self, service: BackingService) -> Result<String> {
        self.call("delete_service_instance", &service.service_instance_name, true)
            .await
    }

    async fn deploy_application(&self, application: BackingApplication) -> Result<String> {
        self.call("deploy_application", &application.name, false).await
    }

    async fn update_application(&self, application: BackingApplication) -> Result<String> {
        self.call("update_application", &application.name, false).await
    }

    async fn undeploy_application(&self, application: BackingApplication) -> Result<String> {
        self.call("undeploy_application", &application.name, false)
            .await
    }
}

/// Target service that tags what it saw and passes everything through.
pub struct RecordingTargetService {
    log: CallLog,
}

impl RecordingTargetService {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl TargetService for RecordingTargetService {
    async fn add_to_backing_services(
        &self,
        services: BackingServices,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingServices> {
        self.log.push(format!(
            "target.services {service_instance_id} {}",
            target.map(|t| t.name.as_str()).unwrap_or("-")
        ));
        Ok(services)
    }

    async fn add_to_backing_applications(
        &self,
        applications: BackingApplications,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingApplications> {
        self.log.push(format!(
            "target.apps {service_instance_id} {}",
            target.map(|t| t.name.as_str()).unwrap_or("-")
        ));
        Ok(applications)
    }
}

pub struct RecordingCredentialProvider {
    log: CallLog,
}

impl RecordingCredentialProvider {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl CredentialProviderService for RecordingCredentialProvider {
    async fn add_credentials(
        &self,
        applications: BackingApplications,
        service_instance_id: &str,
    ) -> Result<BackingApplications> {
        self.log
            .push(format!("credentials.add {service_instance_id}"));
        Ok(applications)
    }

    async fn delete_credentials(
        &self,
        applications: BackingApplications,
        service_instance_id: &str,
    ) -> Result<BackingApplications> {
        self.log
            .push(format!("credentials.delete {service_instance_id}"));
        Ok(applications)
    }
}

/// All collaborators of one workflow, wired to a shared call log.
pub struct Harness {
    pub log: CallLog,
    pub provision: BackingServicesProvisionService,
    pub deployment: BackingAppDeploymentService,
    pub parameters: ParametersTransformationService,
    pub credentials: Arc<RecordingCredentialProvider>,
    pub targets: Arc<RecordingTargetService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_deployer(RecordingDeployer::new)
    }

    pub fn with_deployer(build: impl FnOnce(CallLog) -> RecordingDeployer) -> Self {
        let log = CallLog::default();
        let deployer = Arc::new(build(log.clone()));
        Self {
            provision: BackingServicesProvisionService::new(deployer.clone()),
            deployment: BackingAppDeploymentService::new(deployer),
            parameters: ParametersTransformationService::new(Arc::new(
                TransformerRegistry::with_builtins(),
            )),
            credentials: Arc::new(RecordingCredentialProvider::new(log.clone())),
            targets: Arc::new(RecordingTargetService::new(log.clone())),
            log,
        }
    }
}

pub fn service_definition() -> ServiceDefinition {
    ServiceDefinition::new("sd-id", "mysql")
}

pub fn plan(name: &str) -> Plan {
    Plan::new(format!("{name}-id"), name)
}
