//! The brokered-services catalog.
//!
//! Maps a (service definition, plan) pair onto the backing services,
//! backing applications and target policy that implement it. The catalog
//! is owned by configuration and is read-only to the workflows.

use serde::{Deserialize, Serialize};

use crate::backing::{BackingApplications, BackingServices};

/// Names a target-placement policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
}

impl TargetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokeredService {
    /// Service definition name this entry answers for.
    pub service_name: String,
    /// Plan name this entry answers for.
    pub plan_name: String,
    /// Applications to deploy.
    #[serde(default)]
    pub apps: BackingApplications,
    /// Service instances to provision.
    #[serde(default)]
    pub services: BackingServices,
    /// Target-placement policy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetSpec>,
}

impl BrokeredService {
    pub fn new(service_name: impl Into<String>, plan_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            plan_name: plan_name.into(),
            ..Default::default()
        }
    }

    /// Whether this entry answers for the given service definition and plan.
    pub fn matches(&self, service_name: &str, plan_name: &str) -> bool {
        self.service_name == service_name && self.plan_name == plan_name
    }
}

/// The full catalog, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokeredServices {
    entries: Vec<BrokeredService>,
}

impl BrokeredServices {
    pub fn new(entries: Vec<BrokeredService>) -> Self {
        Self { entries }
    }

    /// Find the entry for a service definition and plan. First match wins.
    pub fn find(&self, service_name: &str, plan_name: &str) -> Option<&BrokeredService> {
        self.entries
            .iter()
            .find(|entry| entry.matches(service_name, plan_name))
    }

    /// Backing services for an offering, `None` when the offering is unknown.
    pub fn backing_services_for(
        &self,
        service_name: &str,
        plan_name: &str,
    ) -> Option<BackingServices> {
        self.find(service_name, plan_name)
            .map(|entry| entry.services.clone())
    }

    /// Backing applications for an offering, `None` when the offering is unknown.
    pub fn backing_applications_for(
        &self,
        service_name: &str,
        plan_name: &str,
    ) -> Option<BackingApplications> {
        self.find(service_name, plan_name).map(|entry| entry.apps.clone())
    }

    /// Target policy for an offering.
    pub fn target_for(&self, service_name: &str, plan_name: &str) -> Option<TargetSpec> {
        self.find(service_name, plan_name)
            .and_then(|entry| entry.target.clone())
    }

    pub fn entries(&self) -> &[BrokeredService] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<BrokeredService>> for BrokeredServices {
    fn from(entries: Vec<BrokeredService>) -> Self {
        Self::new(entries)
    }
}
