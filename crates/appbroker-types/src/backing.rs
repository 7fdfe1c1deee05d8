//! Backing service and backing application specifications.
//!
//! Both are plain values: enrichment (targets, credentials, parameter
//! transformers) always produces a modified copy instead of mutating
//! shared state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat parameter mapping, as received from a broker request.
pub type Parameters = serde_json::Map<String, Value>;

/// Ordered backing services. Order comes from the catalog and is kept for reporting.
pub type BackingServices = Vec<BackingService>;

/// Ordered backing applications. Same ordering contract as [`BackingServices`].
pub type BackingApplications = Vec<BackingApplication>;

/// A reference to a named parameters transformer plus its raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersTransformerSpec {
    /// Registry key of the transformer factory.
    pub name: String,
    /// Arguments bound into the factory's typed configuration.
    #[serde(default)]
    pub args: Parameters,
}

impl ParametersTransformerSpec {
    /// Create a spec with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Parameters::new(),
        }
    }

    /// Add an argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// A reference to a named credential provider plus its raw arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialProviderSpec {
    pub name: String,
    #[serde(default)]
    pub args: Parameters,
}

/// One backing service instance to provision on behalf of an offering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackingService {
    /// Name of the service instance to create on the platform.
    pub service_instance_name: String,
    /// Service offering name in the platform marketplace.
    pub name: String,
    /// Plan of the service offering.
    pub plan: String,
    /// Instance-level provisioning parameters.
    #[serde(default)]
    pub parameters: Parameters,
    /// Placement hints (e.g. `target`).
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Whether apps bound to this service must be rebound on update.
    #[serde(default)]
    pub rebind_on_update: bool,
}

impl BackingService {
    pub fn new(
        service_instance_name: impl Into<String>,
        name: impl Into<String>,
        plan: impl Into<String>,
    ) -> Self {
        Self {
            service_instance_name: service_instance_name.into(),
            name: name.into(),
            plan: plan.into(),
            ..Default::default()
        }
    }

    /// Add a provisioning parameter.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Add a placement property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// One backing application to deploy on behalf of an offering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackingApplication {
    /// Application name on the platform.
    pub name: String,
    /// Artifact path or image reference.
    #[serde(default)]
    pub path: String,
    /// Deployment properties and placement hints.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Environment exposed to the running application.
    #[serde(default)]
    pub environment: Parameters,
    /// Service instance names the application binds to.
    #[serde(default)]
    pub services: Vec<String>,
    /// Transformer chain, applied in declaration order.
    #[serde(default)]
    pub parameters_transformers: Vec<ParametersTransformerSpec>,
    /// Credential providers for the application.
    #[serde(default)]
    pub credential_providers: Vec<CredentialProviderSpec>,
}

impl BackingApplication {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Append a transformer to the chain.
    pub fn with_transformer(mut self, spec: ParametersTransformerSpec) -> Self {
        self.parameters_transformers.push(spec);
        self
    }

    /// Add a deployment property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Add an environment entry.
    pub fn with_environment(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Bind a service instance by name.
    pub fn with_service(mut self, service_instance_name: impl Into<String>) -> Self {
        self.services.push(service_instance_name.into());
        self
    }
}
