//! Target placement of backing services and applications.
//!
//! A target policy decides where on the platform a service instance's
//! backing resources live. Enrichment never mutates the input; the
//! collection is returned as a modified copy.

use std::sync::Arc;

use appbroker_types::{BackingApplications, BackingServices, TargetSpec};
use async_trait::async_trait;
use tracing::debug;

use crate::error::{BrokerError, Result};

/// Property carrying the placement target (space or namespace).
pub const TARGET_PROPERTY: &str = "target";

/// Each service instance gets its own space, named after the instance id.
pub const SPACE_PER_SERVICE_INSTANCE: &str = "SpacePerServiceInstance";

/// Backing resources share a space; names are suffixed with the instance id.
pub const SERVICE_INSTANCE_GUID_SUFFIX: &str = "ServiceInstanceGuidSuffix";

/// Applies a target policy to backing services and applications.
#[async_trait]
pub trait TargetService: Send + Sync {
    async fn add_to_backing_services(
        &self,
        services: BackingServices,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingServices>;

    async fn add_to_backing_applications(
        &self,
        applications: BackingApplications,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingApplications>;
}

/// Shared target service type.
pub type SharedTargetService = Arc<dyn TargetService>;

/// Target service implementing the two standard policies.
///
/// Without a target spec the collections are returned unchanged. An unknown
/// policy name is a collaborator error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTargetService;

enum Policy {
    SpacePerServiceInstance,
    ServiceInstanceGuidSuffix,
}

impl Policy {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            SPACE_PER_SERVICE_INSTANCE => Some(Policy::SpacePerServiceInstance),
            SERVICE_INSTANCE_GUID_SUFFIX => Some(Policy::ServiceInstanceGuidSuffix),
            _ => None,
        }
    }

    fn resolve(target: &TargetSpec) -> Result<Self> {
        Self::from_name(&target.name).ok_or_else(|| {
            BrokerError::Collaborator(format!("unknown target policy '{}'", target.name))
        })
    }
}

impl DefaultTargetService {
    /// Whether `name` is a target policy this service can apply.
    pub fn supports(name: &str) -> bool {
        Policy::from_name(name).is_some()
    }
}

#[async_trait]
impl TargetService for DefaultTargetService {
    async fn add_to_backing_services(
        &self,
        services: BackingServices,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingServices> {
        let Some(target) = target else {
            return Ok(services);
        };
        let policy = Policy::resolve(target)?;
        debug!(target = %target.name, service_instance_id, "Adding target to backing services");

        Ok(services
            .into_iter()
            .map(|mut service| {
                match policy {
                    Policy::SpacePerServiceInstance => {
                        service
                            .properties
                            .insert(TARGET_PROPERTY.to_string(), service_instance_id.to_string());
                    }
                    Policy::ServiceInstanceGuidSuffix => {
                        service.service_instance_name =
                            format!("{}-{}", service.service_instance_name, service_instance_id);
                    }
                }
                service
            })
            .collect())
    }

    async fn add_to_backing_applications(
        &self,
        applications: BackingApplications,
        target: Option<&TargetSpec>,
        service_instance_id: &str,
    ) -> Result<BackingApplications> {
        let Some(target) = target else {
            return Ok(applications);
        };
        let policy = Policy::resolve(target)?;
        debug!(target = %target.name, service_instance_id, "Adding target to backing applications");

        Ok(applications
            .into_iter()
            .map(|mut app| {
                match policy {
                    Policy::SpacePerServiceInstance => {
                        app.properties
                            .insert(TARGET_PROPERTY.to_string(), service_instance_id.to_string());
                    }
                    Policy::ServiceInstanceGuidSuffix => {
                        app.name = format!("{}-{}", app.name, service_instance_id);
                        app.services = app
                            .services
                            .iter()
                            .map(|bound| format!("{bound}-{service_instance_id}"))
                            .collect();
                    }
                }
                app
            })
            .collect())
    }
}
