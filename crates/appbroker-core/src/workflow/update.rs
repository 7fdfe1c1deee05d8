//! Update workflow: update backing services, then redeploy backing applications.

use std::sync::Arc;

use appbroker_types::{
    BrokeredServices, ServiceInstanceResponseBuilder, UpdateServiceInstanceRequest,
};
use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{AppDeploymentInstanceWorkflow, UpdateServiceInstanceWorkflow};
use crate::deployment::BackingAppDeploymentService;
use crate::error::Result;
use crate::parameters::ParametersTransformationService;
use crate::provision::BackingServicesProvisionService;
use crate::targets::SharedTargetService;

/// Updates a service instance's backing services, then redeploys its
/// applications with the new request parameters.
///
/// Credentials are left as they were at creation.
pub struct AppDeploymentUpdateServiceInstanceWorkflow {
    base: AppDeploymentInstanceWorkflow,
    provision: BackingServicesProvisionService,
    deployment: BackingAppDeploymentService,
    parameters: ParametersTransformationService,
    targets: SharedTargetService,
    order: i32,
}

impl AppDeploymentUpdateServiceInstanceWorkflow {
    pub fn new(
        catalog: Arc<BrokeredServices>,
        provision: BackingServicesProvisionService,
        deployment: BackingAppDeploymentService,
        parameters: ParametersTransformationService,
        targets: SharedTargetService,
    ) -> Self {
        Self {
            base: AppDeploymentInstanceWorkflow::new(catalog),
            provision,
            deployment,
            parameters,
            targets,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    async fn update_backing_services(&self, request: &UpdateServiceInstanceRequest) -> Result<()> {
        let Some(services) = self
            .base
            .backing_services(&request.service_definition, &request.plan)
        else {
            return Ok(());
        };

        let target = self
            .base
            .target(&request.service_definition, &request.plan);
        let services = self
            .targets
            .add_to_backing_services(services, target.as_ref(), &request.service_instance_id)
            .await?;
        let updated = self.provision.update_service_instance(services).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = updated.len(),
            "Updated backing services"
        );
        Ok(())
    }

    async fn update_backing_applications(
        &self,
        request: &UpdateServiceInstanceRequest,
    ) -> Result<()> {
        let Some(applications) = self
            .base
            .backing_applications(&request.service_definition, &request.plan)
        else {
            return Ok(());
        };

        let applications = self
            .parameters
            .transform_parameters(applications, &request.parameters)
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
        let updated = self.deployment.update(applications).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = updated.len(),
            "Updated backing applications"
        );
        Ok(())
    }
}

#[async_trait]
impl UpdateServiceInstanceWorkflow for AppDeploymentUpdateServiceInstanceWorkflow {
    fn order(&self) -> i32 {
        self.order
    }

    async fn accept(&self, request: &UpdateServiceInstanceRequest) -> bool {
        self.base
            .accept(&request.service_definition, &request.plan)
    }

    async fn update(&self, request: &UpdateServiceInstanceRequest) -> Result<()> {
        info!(
            service_instance_id = %request.service_instance_id,
            service = %request.service_definition.name,
            plan = %request.plan.name,
            "Updating service instance"
        );

        let result = async {
            self.update_backing_services(request).await?;
            self.update_backing_applications(request).await
        }
        .await;

        match &result {
            Ok(()) => info!(service_instance_id = %request.service_instance_id, "Updated service instance"),
            Err(e) => error!(
                service_instance_id = %request.service_instance_id,
                error = %e,
                "Error updating service instance"
            ),
        }
        result
    }

    async fn build_response(
        &self,
        _request: &UpdateServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder.is_async(true).operation("updating"))
    }
}
