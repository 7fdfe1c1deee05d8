//! Configuration types.
//!
//! ```toml
//! [broker]
//! max_concurrency = 8
//!
//! [[services]]
//! service_name = "example"
//! plan_name = "standard"
//! target = { name = "SpacePerServiceInstance" }
//!
//! [[services.apps]]
//! name = "example-app"
//! path = "maven://com.example:app:1.0.0"
//! parameters_transformers = [
//!     { name = "EnvironmentMapping", args = { include = "count,lang" } },
//! ]
//!
//! [[services.services]]
//! service_instance_name = "example-db"
//! name = "mysql"
//! plan = "small"
//! ```

use std::collections::HashSet;

use appbroker_types::{BrokeredService, BrokeredServices};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Broker-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrokerSettings {
    /// Upper bound on concurrent deployer calls within one parallel stage.
    /// `None` dispatches every element at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppBrokerConfig {
    #[serde(default)]
    pub broker: BrokerSettings,
    /// Catalog entries, in declaration order.
    #[serde(default)]
    pub services: Vec<BrokeredService>,
}

impl AppBrokerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Catalog entries with the same service and plan are replaced in place;
    /// new entries are appended.
    pub fn merge(&mut self, other: AppBrokerConfig) {
        if other.broker.max_concurrency.is_some() {
            self.broker.max_concurrency = other.broker.max_concurrency;
        }

        for entry in other.services {
            match self
                .services
                .iter_mut()
                .find(|existing| existing.matches(&entry.service_name, &entry.plan_name))
            {
                Some(existing) => *existing = entry,
                None => self.services.push(entry),
            }
        }
    }

    /// Check the catalog for structural problems.
    ///
    /// Transformer names are not checked here: an unknown transformer is
    /// reported when a workflow tries to apply it.
    pub fn validate(&self) -> Result<()> {
        if self.broker.max_concurrency == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "broker.max_concurrency".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (index, entry) in self.services.iter().enumerate() {
            let context = format!("services[{index}]");
            if entry.service_name.is_empty() {
                return Err(missing("service_name", &context));
            }
            if entry.plan_name.is_empty() {
                return Err(missing("plan_name", &context));
            }
            if !seen.insert((entry.service_name.as_str(), entry.plan_name.as_str())) {
                return Err(ConfigError::DuplicateService {
                    service: entry.service_name.clone(),
                    plan: entry.plan_name.clone(),
                });
            }

            for (app_index, app) in entry.apps.iter().enumerate() {
                if app.name.is_empty() {
                    return Err(missing("name", &format!("{context}.apps[{app_index}]")));
                }
                for (spec_index, spec) in app.parameters_transformers.iter().enumerate() {
                    if spec.name.is_empty() {
                        return Err(missing(
                            "name",
                            &format!(
                                "{context}.apps[{app_index}].parameters_transformers[{spec_index}]"
                            ),
                        ));
                    }
                }
            }

            for (service_index, service) in entry.services.iter().enumerate() {
                let service_context = format!("{context}.services[{service_index}]");
                if service.service_instance_name.is_empty() {
                    return Err(missing("service_instance_name", &service_context));
                }
                if service.name.is_empty() {
                    return Err(missing("name", &service_context));
                }
            }
        }

        Ok(())
    }

    /// Build the read-only catalog handed to the workflows.
    pub fn catalog(&self) -> BrokeredServices {
        BrokeredServices::new(self.services.clone())
    }
}

fn missing(field: &str, context: &str) -> ConfigError {
    ConfigError::MissingField {
        field: field.to_string(),
        context: context.to_string(),
    }
}
