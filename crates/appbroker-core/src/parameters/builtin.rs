//! Built-in parameters transformers.
//!
//! - `EnvironmentMapping`: copies selected request parameters into the
//!   application's environment.
//! - `PropertyMapping`: copies selected request parameters into the
//!   application's deployment properties.
//!
//! Both are configured with `include`, a comma-separated list of parameter
//! keys. Parameters not listed are left alone; without `include` nothing is
//! mapped.

use std::sync::Arc;

use appbroker_types::{BackingApplication, Parameters};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{ParametersTransformer, ParametersTransformerFactory, SharedParametersTransformer};
use crate::error::Result;

/// Configuration shared by the mapping transformers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Comma-separated parameter keys to map.
    pub include: Option<String>,
}

impl MappingConfig {
    /// The included keys, trimmed, empty entries dropped.
    pub fn includes(&self) -> Vec<String> {
        self.include
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Factory for the `EnvironmentMapping` transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentMappingTransformerFactory;

impl ParametersTransformerFactory for EnvironmentMappingTransformerFactory {
    type Config = MappingConfig;

    fn name(&self) -> &str {
        "EnvironmentMapping"
    }

    fn create(&self, config: MappingConfig) -> SharedParametersTransformer {
        Arc::new(EnvironmentMapping {
            includes: config.includes(),
        })
    }
}

struct EnvironmentMapping {
    includes: Vec<String>,
}

#[async_trait]
impl ParametersTransformer for EnvironmentMapping {
    async fn transform(
        &self,
        mut application: BackingApplication,
        parameters: &Parameters,
    ) -> Result<BackingApplication> {
        for key in &self.includes {
            if let Some(value) = parameters.get(key) {
                debug!(app = %application.name, key = %key, "Mapping parameter to environment");
                application.environment.insert(key.clone(), value.clone());
            }
        }
        Ok(application)
    }
}

/// Factory for the `PropertyMapping` transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyMappingTransformerFactory;

impl ParametersTransformerFactory for PropertyMappingTransformerFactory {
    type Config = MappingConfig;

    fn name(&self) -> &str {
        "PropertyMapping"
    }

    fn create(&self, config: MappingConfig) -> SharedParametersTransformer {
        Arc::new(PropertyMapping {
            includes: config.includes(),
        })
    }
}

struct PropertyMapping {
    includes: Vec<String>,
}

#[async_trait]
impl ParametersTransformer for PropertyMapping {
    async fn transform(
        &self,
        mut application: BackingApplication,
        parameters: &Parameters,
    ) -> Result<BackingApplication> {
        for key in &self.includes {
            if let Some(value) = parameters.get(key) {
                debug!(app = %application.name, key = %key, "Mapping parameter to property");
                application
                    .properties
                    .insert(key.clone(), property_value(value));
            }
        }
        Ok(application)
    }
}

/// Strings are kept verbatim, everything else is JSON-encoded.
fn property_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
