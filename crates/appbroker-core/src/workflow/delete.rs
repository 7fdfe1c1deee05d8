//! Delete workflow: deprovision backing services, then undeploy backing applications.

use std::sync::Arc;

use appbroker_types::{
    BrokeredServices, DeleteServiceInstanceRequest, ServiceInstanceResponseBuilder,
};
use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{AppDeploymentInstanceWorkflow, DeleteServiceInstanceWorkflow};
use crate::credentials::SharedCredentialProvider;
use crate::deployment::BackingAppDeploymentService;
use crate::error::Result;
use crate::provision::BackingServicesProvisionService;
use crate::targets::SharedTargetService;

/// Tears down a service instance's backing services, then its applications.
///
/// Stages:
/// 1. backing services → target → deprovision (all complete before 2 starts)
/// 2. backing applications → delete credentials → target → undeploy
///
/// A failing stage aborts everything after it. Nothing already torn down is
/// restored.
pub struct AppDeploymentDeleteServiceInstanceWorkflow {
    base: AppDeploymentInstanceWorkflow,
    provision: BackingServicesProvisionService,
    deployment: BackingAppDeploymentService,
    credentials: SharedCredentialProvider,
    targets: SharedTargetService,
    order: i32,
}

impl AppDeploymentDeleteServiceInstanceWorkflow {
    pub fn new(
        catalog: Arc<BrokeredServices>,
        provision: BackingServicesProvisionService,
        deployment: BackingAppDeploymentService,
        credentials: SharedCredentialProvider,
        targets: SharedTargetService,
    ) -> Self {
        Self {
            base: AppDeploymentInstanceWorkflow::new(catalog),
            provision,
            deployment,
            credentials,
            targets,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    async fn delete_backing_services(&self, request: &DeleteServiceInstanceRequest) -> Result<()> {
        let Some(services) = self
            .base
            .backing_services(&request.service_definition, &request.plan)
        else {
            debug!(service_instance_id = %request.service_instance_id, "No backing services to delete");
            return Ok(());
        };

        let target = self
            .base
            .target(&request.service_definition, &request.plan);
        let services = self
            .targets
            .add_to_backing_services(services, target.as_ref(), &request.service_instance_id)
            .await?;
        let deleted = self.provision.delete_service_instance(services).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = deleted.len(),
            "Deleted backing services"
        );
        Ok(())
    }

    async fn undeploy_backing_applications(
        &self,
        request: &DeleteServiceInstanceRequest,
    ) -> Result<()> {
        let Some(applications) = self
            .base
            .backing_applications(&request.service_definition, &request.plan)
        else {
            debug!(service_instance_id = %request.service_instance_id, "No backing applications to undeploy");
            return Ok(());
        };

        let applications = self
            .credentials
            .delete_credentials(applications, &request.service_instance_id)
            .await?;
        let target = self
            .base
            .target(&request.service_definition, &request.plan);
        let applications = self
            .targets
            .add_to_backing_applications(
                applications,
                target.as_ref(),
                &request.service_instance_id,
            )
            .await?;
        let undeployed = self.deployment.undeploy(applications).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = undeployed.len(),
            "Undeployed backing applications"
        );
        Ok(())
    }
}

#[async_trait]
impl DeleteServiceInstanceWorkflow for AppDeploymentDeleteServiceInstanceWorkflow {
    fn order(&self) -> i32 {
        self.order
    }

    async fn accept(&self, request: &DeleteServiceInstanceRequest) -> bool {
        self.base
            .accept(&request.service_definition, &request.plan)
    }

    async fn delete(&self, request: &DeleteServiceInstanceRequest) -> Result<()> {
        info!(
            service_instance_id = %request.service_instance_id,
            service = %request.service_definition.name,
            plan = %request.plan.name,
            "Deleting service instance"
        );

        let result = async {
            self.delete_backing_services(request).await?;
            self.undeploy_backing_applications(request).await
        }
        .await;

        match &result {
            Ok(()) => info!(service_instance_id = %request.service_instance_id, "Deleted service instance"),
            Err(e) => error!(
                service_instance_id = %request.service_instance_id,
                error = %e,
                "Error deleting service instance"
            ),
        }
        result
    }

    async fn build_response(
        &self,
        _request: &DeleteServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder.is_async(true).operation("deleting"))
    }
}
