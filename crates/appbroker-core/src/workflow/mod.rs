//! Service instance workflows.
//!
//! A workflow owns one broker operation (create, update or delete) for the
//! offerings it accepts. Stages inside a workflow run strictly in sequence;
//! parallelism only happens inside a stage, in the provisioning and
//! deployment fan-outs.

mod create;
mod delete;
mod dispatcher;
mod update;

use std::sync::Arc;

use appbroker_types::{
    BackingApplications, BackingServices, BrokeredServices, CreateServiceInstanceRequest,
    DeleteServiceInstanceRequest, Plan, ServiceDefinition, ServiceInstanceResponseBuilder,
    TargetSpec, UpdateServiceInstanceRequest,
};
use async_trait::async_trait;

use crate::error::Result;

pub use create::AppDeploymentCreateServiceInstanceWorkflow;
pub use delete::AppDeploymentDeleteServiceInstanceWorkflow;
pub use dispatcher::{ServiceInstanceOperation, WorkflowDispatcher};
pub use update::AppDeploymentUpdateServiceInstanceWorkflow;

/// Workflow run when a service instance is created.
#[async_trait]
pub trait CreateServiceInstanceWorkflow: Send + Sync {
    /// Priority among create workflows; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    async fn accept(&self, request: &CreateServiceInstanceRequest) -> bool;

    async fn create(&self, request: &CreateServiceInstanceRequest) -> Result<()>;

    async fn build_response(
        &self,
        _request: &CreateServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder)
    }
}

/// Workflow run when a service instance is updated.
#[async_trait]
pub trait UpdateServiceInstanceWorkflow: Send + Sync {
    /// Priority among update workflows; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    async fn accept(&self, request: &UpdateServiceInstanceRequest) -> bool;

    async fn update(&self, request: &UpdateServiceInstanceRequest) -> Result<()>;

    async fn build_response(
        &self,
        _request: &UpdateServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder)
    }
}

/// Workflow run when a service instance is deleted.
#[async_trait]
pub trait DeleteServiceInstanceWorkflow: Send + Sync {
    /// Priority among delete workflows; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    async fn accept(&self, request: &DeleteServiceInstanceRequest) -> bool;

    async fn delete(&self, request: &DeleteServiceInstanceRequest) -> Result<()>;

    async fn build_response(
        &self,
        _request: &DeleteServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder)
    }
}

/// Catalog lookups shared by the app deployment workflows.
///
/// Lookups return `None` both for offerings missing from the catalog and
/// for offerings that declare no services (resp. applications), so callers
/// can skip the whole stage.
#[derive(Debug, Clone)]
pub struct AppDeploymentInstanceWorkflow {
    catalog: Arc<BrokeredServices>,
}

impl AppDeploymentInstanceWorkflow {
    pub fn new(catalog: Arc<BrokeredServices>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &BrokeredServices {
        &self.catalog
    }

    /// True iff the catalog has an entry for this service definition and plan.
    pub fn accept(&self, service_definition: &ServiceDefinition, plan: &Plan) -> bool {
        self.catalog
            .find(&service_definition.name, &plan.name)
            .is_some()
    }

    pub fn backing_services(
        &self,
        service_definition: &ServiceDefinition,
        plan: &Plan,
    ) -> Option<BackingServices> {
        self.catalog
            .backing_services_for(&service_definition.name, &plan.name)
            .filter(|services| !services.is_empty())
    }

    pub fn backing_applications(
        &self,
        service_definition: &ServiceDefinition,
        plan: &Plan,
    ) -> Option<BackingApplications> {
        self.catalog
            .backing_applications_for(&service_definition.name, &plan.name)
            .filter(|apps| !apps.is_empty())
    }

    pub fn target(&self, service_definition: &ServiceDefinition, plan: &Plan) -> Option<TargetSpec> {
        self.catalog
            .target_for(&service_definition.name, &plan.name)
    }
}
