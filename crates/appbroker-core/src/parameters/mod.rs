//! Parameters transformers and their registry.
//!
//! A backing application declares an ordered chain of
//! [`ParametersTransformerSpec`]s. Each spec names a factory in the
//! [`TransformerRegistry`] and carries raw arguments that the factory binds
//! into its own typed configuration before producing a transformer.
//!
//! # Example
//!
//! ```rust,ignore
//! use appbroker_core::{ParametersTransformerFactory, TransformerRegistry};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct UpperCaseConfig { key: Option<String> }
//!
//! struct UpperCaseFactory;
//!
//! impl ParametersTransformerFactory for UpperCaseFactory {
//!     type Config = UpperCaseConfig;
//!     fn name(&self) -> &str { "UpperCase" }
//!     fn create(&self, config: UpperCaseConfig) -> SharedParametersTransformer { ... }
//! }
//!
//! let mut registry = TransformerRegistry::new();
//! registry.register(UpperCaseFactory);
//! ```
//!
//! [`ParametersTransformerSpec`]: appbroker_types::ParametersTransformerSpec

mod builtin;
mod service;

use std::collections::HashMap;
use std::sync::Arc;

use appbroker_types::{BackingApplication, Parameters};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{BrokerError, Result};

pub use builtin::{
    EnvironmentMappingTransformerFactory, MappingConfig, PropertyMappingTransformerFactory,
};
pub use service::ParametersTransformationService;

/// A configured transformation applied to one backing application.
#[async_trait]
pub trait ParametersTransformer: Send + Sync {
    /// Produce the transformed application.
    ///
    /// `parameters` is the unmodified request parameter mapping; every
    /// transformer in every chain sees the same mapping.
    async fn transform(
        &self,
        application: BackingApplication,
        parameters: &Parameters,
    ) -> Result<BackingApplication>;
}

/// Shared transformer type.
pub type SharedParametersTransformer = Arc<dyn ParametersTransformer>;

/// A named factory with a typed configuration.
///
/// Implement this for each transformer; the registry stores it through the
/// object-safe [`TransformerFactory`].
pub trait ParametersTransformerFactory: Send + Sync {
    /// Configuration shape bound from a spec's arguments.
    type Config: Serialize + DeserializeOwned + Default;

    /// Registry key.
    fn name(&self) -> &str;

    /// Build a transformer bound to `config`.
    fn create(&self, config: Self::Config) -> SharedParametersTransformer;
}

/// Object-safe view of a factory, working on raw spec arguments.
pub trait TransformerFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Bind `args` into the factory's configuration and build a transformer.
    fn create_from_args(&self, args: &Parameters) -> Result<SharedParametersTransformer>;
}

impl<F: ParametersTransformerFactory> TransformerFactory for F {
    fn name(&self) -> &str {
        ParametersTransformerFactory::name(self)
    }

    fn create_from_args(&self, args: &Parameters) -> Result<SharedParametersTransformer> {
        let name = ParametersTransformerFactory::name(self);
        let config = bind_config::<F::Config>(name, args)?;
        Ok(self.create(config))
    }
}

/// Bind raw arguments into a typed configuration.
///
/// The default configuration is serialized first and `args` is laid over
/// it, so keys missing from `args` keep their default values. Keys the
/// configuration doesn't declare are ignored unless the configuration type
/// opts into `deny_unknown_fields`. A value of the wrong type is a
/// configuration error naming the transformer.
pub fn bind_config<C>(name: &str, args: &Parameters) -> Result<C>
where
    C: Serialize + DeserializeOwned + Default,
{
    let invalid = |e: serde_json::Error| {
        BrokerError::Configuration(format!(
            "invalid configuration for parameters transformer '{name}': {e}"
        ))
    };

    let mut merged = match serde_json::to_value(C::default()).map_err(invalid)? {
        Value::Object(defaults) => defaults,
        _ => Parameters::new(),
    };
    for (key, value) in args {
        merged.insert(key.clone(), value.clone());
    }

    serde_json::from_value(Value::Object(merged)).map_err(invalid)
}

/// Registry of parameters transformer factories, keyed by name.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    factories: HashMap<String, Arc<dyn TransformerFactory>>,
}

impl TransformerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `EnvironmentMapping` and `PropertyMapping` factories.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EnvironmentMappingTransformerFactory);
        registry.register(PropertyMappingTransformerFactory);
        registry
    }

    /// Register a factory.
    ///
    /// If a factory with the same name already exists, it is replaced.
    pub fn register<F: TransformerFactory + 'static>(&mut self, factory: F) {
        self.register_arc(Arc::new(factory));
    }

    /// Register a factory from an Arc.
    pub fn register_arc(&mut self, factory: Arc<dyn TransformerFactory>) {
        let name = factory.name().to_string();
        if self.factories.insert(name.clone(), factory).is_some() {
            warn!(transformer = %name, "Replacing previously registered parameters transformer");
        }
    }

    /// Get a factory by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn TransformerFactory>> {
        self.factories.get(name).cloned()
    }

    /// Check if a factory exists.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("factories", &self.names())
            .finish()
    }
}
