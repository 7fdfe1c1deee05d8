//! Create workflow: provision backing services, then deploy backing applications.

use std::sync::Arc;

use appbroker_types::{
    BrokeredServices, CreateServiceInstanceRequest, ServiceInstanceResponseBuilder,
};
use async_trait::async_trait;
use tracing::{debug, error, info};

use super::{AppDeploymentInstanceWorkflow, CreateServiceInstanceWorkflow};
use crate::credentials::SharedCredentialProvider;
use crate::deployment::BackingAppDeploymentService;
use crate::error::Result;
use crate::parameters::ParametersTransformationService;
use crate::provision::BackingServicesProvisionService;
use crate::targets::SharedTargetService;

/// Provisions a service instance's backing services, then deploys its
/// applications.
///
/// Services come first so the applications can bind to them. Applications
/// go through their transformer chains with the request parameters, get
/// credentials and a target, and are deployed.
pub struct AppDeploymentCreateServiceInstanceWorkflow {
    base: AppDeploymentInstanceWorkflow,
    provision: BackingServicesProvisionService,
    deployment: BackingAppDeploymentService,
    parameters: ParametersTransformationService,
    credentials: SharedCredentialProvider,
    targets: SharedTargetService,
    order: i32,
}

impl AppDeploymentCreateServiceInstanceWorkflow {
    pub fn new(
        catalog: Arc<BrokeredServices>,
        provision: BackingServicesProvisionService,
        deployment: BackingAppDeploymentService,
        parameters: ParametersTransformationService,
        credentials: SharedCredentialProvider,
        targets: SharedTargetService,
    ) -> Self {
        Self {
            base: AppDeploymentInstanceWorkflow::new(catalog),
            provision,
            deployment,
            parameters,
            credentials,
            targets,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    async fn create_backing_services(&self, request: &CreateServiceInstanceRequest) -> Result<()> {
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
        let created = self.provision.create_service_instance(services).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = created.len(),
            "Created backing services"
        );
        Ok(())
    }

    async fn deploy_backing_applications(
        &self,
        request: &CreateServiceInstanceRequest,
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
        let applications = self
            .credentials
            .add_credentials(applications, &request.service_instance_id)
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
        let deployed = self.deployment.deploy(applications).await?;
        debug!(
            service_instance_id = %request.service_instance_id,
            count = deployed.len(),
            "Deployed backing applications"
        );
        Ok(())
    }
}

#[async_trait]
impl CreateServiceInstanceWorkflow for AppDeploymentCreateServiceInstanceWorkflow {
    fn order(&self) -> i32 {
        self.order
    }

    async fn accept(&self, request: &CreateServiceInstanceRequest) -> bool {
        self.base
            .accept(&request.service_definition, &request.plan)
    }

    async fn create(&self, request: &CreateServiceInstanceRequest) -> Result<()> {
        info!(
            service_instance_id = %request.service_instance_id,
            service = %request.service_definition.name,
            plan = %request.plan.name,
            "Creating service instance"
        );

        let result = async {
            self.create_backing_services(request).await?;
            self.deploy_backing_applications(request).await
        }
        .await;

        match &result {
            Ok(()) => info!(service_instance_id = %request.service_instance_id, "Created service instance"),
            Err(e) => error!(
                service_instance_id = %request.service_instance_id,
                error = %e,
                "Error creating service instance"
            ),
        }
        result
    }

    async fn build_response(
        &self,
        _request: &CreateServiceInstanceRequest,
        builder: ServiceInstanceResponseBuilder,
    ) -> Result<ServiceInstanceResponseBuilder> {
        Ok(builder.is_async(true).operation("creating"))
    }
}
