//! Shared data model for the App Broker.
//!
//! These types describe what a brokered offering is made of (backing
//! services and backing applications), how the catalog maps a service
//! definition and plan onto them, and the minimal broker request/response
//! model that drives the workflows in `appbroker-core`.

pub mod backing;
pub mod broker;
pub mod catalog;

pub use backing::{
    BackingApplication, BackingApplications, BackingService, BackingServices,
    CredentialProviderSpec, Parameters, ParametersTransformerSpec,
};
pub use broker::{
    CreateServiceInstanceRequest, DeleteServiceInstanceRequest, Plan, ServiceDefinition,
    ServiceInstanceResponse, ServiceInstanceResponseBuilder, UpdateServiceInstanceRequest,
};
pub use catalog::{BrokeredService, BrokeredServices, TargetSpec};
