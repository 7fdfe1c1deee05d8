//! Parallel deployment of backing applications.

use std::sync::Arc;

use appbroker_types::{BackingApplication, BackingApplications};

use crate::deployer::SharedDeployerClient;
use crate::error::Result;
use crate::parallel::{Operation, SharedProvisionObserver, TracingObserver, describe, fan_out};

/// Deploys, updates and undeploys backing applications concurrently.
///
/// Same execution and failure semantics as
/// [`BackingServicesProvisionService`](crate::provision::BackingServicesProvisionService),
/// one deployer call per application.
#[derive(Clone)]
pub struct BackingAppDeploymentService {
    deployer: SharedDeployerClient,
    observer: SharedProvisionObserver,
    max_concurrency: Option<usize>,
}

impl BackingAppDeploymentService {
    pub fn new(deployer: SharedDeployerClient) -> Self {
        Self {
            deployer,
            observer: Arc::new(TracingObserver),
            max_concurrency: None,
        }
    }

    pub fn with_observer(mut self, observer: SharedProvisionObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Deploy every application, returning their deployment ids.
    pub async fn deploy(&self, applications: BackingApplications) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(Operation::DeployApplications, applications, move |app| {
            let deployer = Arc::clone(&deployer);
            async move { deployer.deploy_application(app).await }
        })
        .await
    }

    /// Redeploy every application with its updated configuration.
    pub async fn update(&self, applications: BackingApplications) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(Operation::UpdateApplications, applications, move |app| {
            let deployer = Arc::clone(&deployer);
            async move { deployer.update_application(app).await }
        })
        .await
    }

    /// Undeploy every application.
    pub async fn undeploy(&self, applications: BackingApplications) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(Operation::UndeployApplications, applications, move |app| {
            let deployer = Arc::clone(&deployer);
            async move { deployer.undeploy_application(app).await }
        })
        .await
    }

    async fn run<F, Fut>(
        &self,
        operation: Operation,
        applications: BackingApplications,
        call: F,
    ) -> Result<Vec<String>>
    where
        F: Fn(BackingApplication) -> Fut,
        Fut: std::future::Future<Output = Result<String>> + Send + 'static,
    {
        let targets = describe(applications.iter().map(|app| app.name.as_str()));
        fan_out(
            operation,
            applications,
            targets,
            self.max_concurrency,
            self.observer.as_ref(),
            call,
        )
        .await
    }
}
