//! Test doubles shared by the unit tests of this crate.

use std::collections::HashSet;

use appbroker_types::{BackingApplication, BackingService};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::deployer::DeployerClient;
use crate::error::{BrokerError, Result};
use crate::parallel::{Operation, ProvisionObserver};

/// Records observer checkpoints as plain strings.
///
/// Per-element ids are left out of `completed` entries because completion
/// order is not deterministic.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl ProvisionObserver for RecordingObserver {
    fn requested(&self, operation: Operation, targets: &str) {
        self.events
            .lock()
            .push(format!("requested {operation} {targets}"));
    }

    fn completed(&self, operation: Operation, _id: &str) {
        self.events.lock().push(format!("completed {operation}"));
    }

    fn complete(&self, operation: Operation, targets: &str) {
        self.events
            .lock()
            .push(format!("complete {operation} {targets}"));
    }

    fn failed(&self, operation: Operation, targets: &str, error: &BrokerError) {
        self.events
            .lock()
            .push(format!("failed {operation} {targets}: {error}"));
    }
}

/// Deployer that echoes names back and fails for configured names.
#[derive(Debug, Default)]
pub struct MockDeployer {
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockDeployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call for the given service instance or application name.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Calls made so far, as `"<method> <name>"`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, method: &str, name: &str) -> Result<String> {
        self.calls.lock().push(format!("{method} {name}"));
        if self.failing.contains(name) {
            return Err(BrokerError::Deployer(format!("{method} failed for {name}")));
        }
        Ok(name.to_string())
    }
}

#[async_trait]
impl DeployerClient for MockDeployer {
    async fn create_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("create", &service.service_instance_name)
    }

    async fn update_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("update", &service.service_instance_name)
    }

    async fn delete_service_instance(&self, service: BackingService) -> Result<String> {
        self.record("delete", &service.service_instance_name)
    }

    async fn deploy_application(&self, application: BackingApplication) -> Result<String> {
        self.record("deploy", &application.name)
    }

    async fn update_application(&self, application: BackingApplication) -> Result<String> {
        self.record("update-app", &application.name)
    }

    async fn undeploy_application(&self, application: BackingApplication) -> Result<String> {
        self.record("undeploy", &application.name)
    }
}
