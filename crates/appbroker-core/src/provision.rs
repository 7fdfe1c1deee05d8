//! Parallel provisioning of backing service instances.

use std::sync::Arc;

use appbroker_types::{BackingService, BackingServices};

use crate::deployer::SharedDeployerClient;
use crate::error::Result;
use crate::parallel::{Operation, SharedProvisionObserver, TracingObserver, describe, fan_out};

/// Creates, updates and deletes backing service instances concurrently.
///
/// Each service instance is handed to the deployer in its own task. The
/// returned ids arrive in completion order, not input order. If any call
/// fails the whole operation fails with that call's error; instances that
/// were already provisioned are left in place.
#[derive(Clone)]
pub struct BackingServicesProvisionService {
    deployer: SharedDeployerClient,
    observer: SharedProvisionObserver,
    max_concurrency: Option<usize>,
}

impl BackingServicesProvisionService {
    /// Create a service that reports through [`TracingObserver`].
    pub fn new(deployer: SharedDeployerClient) -> Self {
        Self {
            deployer,
            observer: Arc::new(TracingObserver),
            max_concurrency: None,
        }
    }

    /// Replace the observer.
    pub fn with_observer(mut self, observer: SharedProvisionObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Cap the number of deployer calls in flight.
    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub async fn create_service_instance(
        &self,
        backing_services: BackingServices,
    ) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(
            Operation::CreateServiceInstances,
            backing_services,
            move |service| {
                let deployer = Arc::clone(&deployer);
                async move { deployer.create_service_instance(service).await }
            },
        )
        .await
    }

    pub async fn update_service_instance(
        &self,
        backing_services: BackingServices,
    ) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(
            Operation::UpdateServiceInstances,
            backing_services,
            move |service| {
                let deployer = Arc::clone(&deployer);
                async move { deployer.update_service_instance(service).await }
            },
        )
        .await
    }

    pub async fn delete_service_instance(
        &self,
        backing_services: BackingServices,
    ) -> Result<Vec<String>> {
        let deployer = Arc::clone(&self.deployer);
        self.run(
            Operation::DeleteServiceInstances,
            backing_services,
            move |service| {
                let deployer = Arc::clone(&deployer);
                async move { deployer.delete_service_instance(service).await }
            },
        )
        .await
    }

    async fn run<F, Fut>(
        &self,
        operation: Operation,
        backing_services: BackingServices,
        call: F,
    ) -> Result<Vec<String>>
    where
        F: Fn(BackingService) -> Fut,
        Fut: std::future::Future<Output = Result<String>> + Send + 'static,
    {
        let targets = describe(
            backing_services
                .iter()
                .map(|service| service.service_instance_name.as_str()),
        );
        fan_out(
            operation,
            backing_services,
            targets,
            self.max_concurrency,
            self.observer.as_ref(),
            call,
        )
        .await
    }
}
