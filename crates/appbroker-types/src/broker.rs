//! Minimal broker request/response model.
//!
//! Only the fields the orchestration core reads are modelled here; the
//! HTTP surface of the broker API lives elsewhere.

use serde::{Deserialize, Serialize};

use crate::backing::Parameters;

/// A service offering as advertised in the broker catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
}

impl ServiceDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A plan of a service offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
}

impl Plan {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Request to provision a new service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceRequest {
    pub service_instance_id: String,
    pub service_definition: ServiceDefinition,
    pub plan: Plan,
    #[serde(default)]
    pub parameters: Parameters,
}

/// Request to update an existing service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateServiceInstanceRequest {
    pub service_instance_id: String,
    pub service_definition: ServiceDefinition,
    pub plan: Plan,
    #[serde(default)]
    pub parameters: Parameters,
}

/// Request to deprovision a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteServiceInstanceRequest {
    pub service_instance_id: String,
    pub service_definition: ServiceDefinition,
    pub plan: Plan,
}

/// Response handed back to the broker protocol layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstanceResponse {
    /// The operation continues after the response is sent.
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Operation description for last-operation polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ServiceInstanceResponse {
    pub fn builder() -> ServiceInstanceResponseBuilder {
        ServiceInstanceResponseBuilder::default()
    }
}

/// Builder threaded through a workflow's `build_response` step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInstanceResponseBuilder {
    is_async: bool,
    operation: Option<String>,
}

impl ServiceInstanceResponseBuilder {
    /// Mark the operation as asynchronous.
    pub fn is_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn build(self) -> ServiceInstanceResponse {
        ServiceInstanceResponse {
            is_async: self.is_async,
            operation: self.operation,
        }
    }
}
