//! Routes broker requests to the workflow that accepts them.

use std::sync::Arc;

use appbroker_types::{
    CreateServiceInstanceRequest, DeleteServiceInstanceRequest, ServiceInstanceResponse,
    UpdateServiceInstanceRequest,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{
    CreateServiceInstanceWorkflow, DeleteServiceInstanceWorkflow, UpdateServiceInstanceWorkflow,
};
use crate::error::{BrokerError, Result};

/// A dispatched operation: the broker response plus the running workflow.
///
/// The response is available immediately. The workflow keeps running on the
/// runtime even if the operation is dropped.
#[derive(Debug)]
pub struct ServiceInstanceOperation {
    response: ServiceInstanceResponse,
    handle: JoinHandle<Result<()>>,
}

impl ServiceInstanceOperation {
    pub fn response(&self) -> &ServiceInstanceResponse {
        &self.response
    }

    /// Wait for the workflow to finish.
    pub async fn wait(self) -> Result<()> {
        self.handle.await?
    }
}

/// Holds the registered workflows, each list sorted by ascending `order()`.
///
/// Workflows with equal order keep their registration order.
#[derive(Clone, Default)]
pub struct WorkflowDispatcher {
    create: Vec<Arc<dyn CreateServiceInstanceWorkflow>>,
    update: Vec<Arc<dyn UpdateServiceInstanceWorkflow>>,
    delete: Vec<Arc<dyn DeleteServiceInstanceWorkflow>>,
}

impl WorkflowDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_create_workflow(mut self, workflow: Arc<dyn CreateServiceInstanceWorkflow>) -> Self {
        self.create.push(workflow);
        self.create.sort_by_key(|w| w.order());
        self
    }

    pub fn with_update_workflow(mut self, workflow: Arc<dyn UpdateServiceInstanceWorkflow>) -> Self {
        self.update.push(workflow);
        self.update.sort_by_key(|w| w.order());
        self
    }

    pub fn with_delete_workflow(mut self, workflow: Arc<dyn DeleteServiceInstanceWorkflow>) -> Self {
        self.delete.push(workflow);
        self.delete.sort_by_key(|w| w.order());
        self
    }

    /// Start the first accepting create workflow.
    pub async fn create(
        &self,
        request: CreateServiceInstanceRequest,
    ) -> Result<ServiceInstanceOperation> {
        for workflow in &self.create {
            if !workflow.accept(&request).await {
                continue;
            }
            let response = workflow
                .build_response(&request, ServiceInstanceResponse::builder())
                .await?
                .build();
            debug!(service_instance_id = %request.service_instance_id, order = workflow.order(), "Dispatching create workflow");

            let workflow = Arc::clone(workflow);
            let handle = tokio::spawn(async move { workflow.create(&request).await });
            return Ok(ServiceInstanceOperation { response, handle });
        }
        Err(no_workflow(
            "create",
            &request.service_definition.name,
            &request.plan.name,
        ))
    }

    /// Start the first accepting update workflow.
    pub async fn update(
        &self,
        request: UpdateServiceInstanceRequest,
    ) -> Result<ServiceInstanceOperation> {
        for workflow in &self.update {
            if !workflow.accept(&request).await {
                continue;
            }
            let response = workflow
                .build_response(&request, ServiceInstanceResponse::builder())
                .await?
                .build();
            debug!(service_instance_id = %request.service_instance_id, order = workflow.order(), "Dispatching update workflow");

            let workflow = Arc::clone(workflow);
            let handle = tokio::spawn(async move { workflow.update(&request).await });
            return Ok(ServiceInstanceOperation { response, handle });
        }
        Err(no_workflow(
            "update",
            &request.service_definition.name,
            &request.plan.name,
        ))
    }

    /// Start the first accepting delete workflow.
    pub async fn delete(
        &self,
        request: DeleteServiceInstanceRequest,
    ) -> Result<ServiceInstanceOperation> {
        for workflow in &self.delete {
            if !workflow.accept(&request).await {
                continue;
            }
            let response = workflow
                .build_response(&request, ServiceInstanceResponse::builder())
                .await?
                .build();
            debug!(service_instance_id = %request.service_instance_id, order = workflow.order(), "Dispatching delete workflow");

            let workflow = Arc::clone(workflow);
            let handle = tokio::spawn(async move { workflow.delete(&request).await });
            return Ok(ServiceInstanceOperation { response, handle });
        }
        Err(no_workflow(
            "delete",
            &request.service_definition.name,
            &request.plan.name,
        ))
    }
}

fn no_workflow(operation: &'static str, service: &str, plan: &str) -> BrokerError {
    warn!(operation, service, plan, "No workflow accepts request");
    BrokerError::NoWorkflow {
        operation,
        service: service.to_string(),
        plan: plan.to_string(),
    }
}

impl std::fmt::Debug for WorkflowDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowDispatcher")
            .field("create", &self.create.len())
            .field("update", &self.update.len())
            .field("delete", &self.delete.len())
            .finish()
    }
}
