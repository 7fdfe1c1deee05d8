//! Platform deployer contract.
//!
//! The deployer is the only component that talks to the target platform
//! (Cloud Foundry, Kubernetes, ...). Every call handles exactly one backing
//! service or application and is independent of all other calls; fan-out
//! across a collection is done by [`BackingServicesProvisionService`] and
//! [`BackingAppDeploymentService`].
//!
//! [`BackingServicesProvisionService`]: crate::provision::BackingServicesProvisionService
//! [`BackingAppDeploymentService`]: crate::deployment::BackingAppDeploymentService

use std::sync::Arc;

use appbroker_types::{BackingApplication, BackingService};
use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous client for the target platform.
///
/// Implementations report failures as [`BrokerError::Deployer`]. Timeouts,
/// if any, are the implementation's concern.
///
/// [`BrokerError::Deployer`]: crate::error::BrokerError::Deployer
#[async_trait]
pub trait DeployerClient: Send + Sync {
    /// Provision a service instance, returning its name on the platform.
    async fn create_service_instance(&self, service: BackingService) -> Result<String>;

    /// Update a service instance, returning its name on the platform.
    async fn update_service_instance(&self, service: BackingService) -> Result<String>;

    /// Deprovision a service instance, returning its name on the platform.
    async fn delete_service_instance(&self, service: BackingService) -> Result<String>;

    /// Deploy an application, returning its deployment id.
    async fn deploy_application(&self, application: BackingApplication) -> Result<String>;

    /// Redeploy an application with updated configuration.
    async fn update_application(&self, application: BackingApplication) -> Result<String>;

    /// Remove an application, returning its deployment id.
    async fn undeploy_application(&self, application: BackingApplication) -> Result<String>;
}

/// Shared deployer type for use across services and workflows.
pub type SharedDeployerClient = Arc<dyn DeployerClient>;
