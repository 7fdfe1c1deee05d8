//! Orchestration core for the App Broker.
//!
//! Given a brokered offering (service definition + plan), the workflows in
//! this crate resolve its backing services and backing applications from the
//! catalog, run the applications through their parameter transformer chains,
//! enrich everything with target placement and credentials, and drive the
//! platform deployer.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  WorkflowDispatcher                                           │
//! │  - picks the first accepting workflow by order()              │
//! ├───────────────────────────────────────────────────────────────┤
//! │  Create / Update / Delete workflows (strictly sequential)     │
//! │   ├─ ParametersTransformationService ── TransformerRegistry   │
//! │   ├─ TargetService / CredentialProviderService                │
//! │   ├─ BackingServicesProvisionService ─┐  one task per element │
//! │   └─ BackingAppDeploymentService ─────┴─ DeployerClient       │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod credentials;
pub mod deployer;
pub mod deployment;
pub mod error;
pub mod parallel;
pub mod parameters;
pub mod provision;
pub mod targets;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use credentials::{
    CredentialProviderService, PassthroughCredentialProvider, SharedCredentialProvider,
};
pub use deployer::{DeployerClient, SharedDeployerClient};
pub use deployment::BackingAppDeploymentService;
pub use error::{BrokerError, Result};
pub use parallel::{Operation, ProvisionObserver, SharedProvisionObserver, TracingObserver};
pub use parameters::{
    EnvironmentMappingTransformerFactory, MappingConfig, ParametersTransformationService,
    ParametersTransformer, ParametersTransformerFactory, PropertyMappingTransformerFactory,
    SharedParametersTransformer, TransformerFactory, TransformerRegistry, bind_config,
};
pub use provision::BackingServicesProvisionService;
pub use targets::{DefaultTargetService, SharedTargetService, TargetService};
pub use workflow::{
    AppDeploymentCreateServiceInstanceWorkflow, AppDeploymentDeleteServiceInstanceWorkflow,
    AppDeploymentInstanceWorkflow, AppDeploymentUpdateServiceInstanceWorkflow,
    CreateServiceInstanceWorkflow, DeleteServiceInstanceWorkflow, ServiceInstanceOperation,
    UpdateServiceInstanceWorkflow, WorkflowDispatcher,
};
