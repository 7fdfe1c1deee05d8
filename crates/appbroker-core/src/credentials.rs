//! Credential provisioning for backing applications.

use std::sync::Arc;

use appbroker_types::BackingApplications;
use async_trait::async_trait;

use crate::error::Result;

/// Creates and tears down the credentials backing applications use.
///
/// Implementations typically generate credentials per service instance and
/// expose them to the applications through their environment.
#[async_trait]
pub trait CredentialProviderService: Send + Sync {
    async fn add_credentials(
        &self,
        applications: BackingApplications,
        service_instance_id: &str,
    ) -> Result<BackingApplications>;

    async fn delete_credentials(
        &self,
        applications: BackingApplications,
        service_instance_id: &str,
    ) -> Result<BackingApplications>;
}

/// Shared credential provider type.
pub type SharedCredentialProvider = Arc<dyn CredentialProviderService>;

/// Provider for offerings whose applications need no generated credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCredentialProvider;

#[async_trait]
impl CredentialProviderService for PassthroughCredentialProvider {
    async fn add_credentials(
        &self,
        applications: BackingApplications,
        _service_instance_id: &str,
    ) -> Result<BackingApplications> {
        Ok(applications)
    }

    async fn delete_credentials(
        &self,
        applications: BackingApplications,
        _service_instance_id: &str,
    ) -> Result<BackingApplications> {
        Ok(applications)
    }
}
