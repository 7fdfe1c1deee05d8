//! Applies declared transformer chains to backing applications.

use std::sync::Arc;

use appbroker_types::{BackingApplication, BackingApplications, Parameters};
use tracing::debug;

use super::TransformerRegistry;
use crate::error::{BrokerError, Result};

/// Runs each application's parameters transformer chain.
#[derive(Debug, Clone, Default)]
pub struct ParametersTransformationService {
    registry: Arc<TransformerRegistry>,
}

impl ParametersTransformationService {
    pub fn new(registry: Arc<TransformerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// Transform every application with its own chain, in declaration order.
    ///
    /// Each transformer is built from its spec's arguments only and is
    /// handed the same, unmodified `parameters`. The first unknown name or
    /// failing transformer aborts the whole call; no partial result is
    /// returned. When no application declares a transformer, the input
    /// collection is handed back as is.
    pub async fn transform_parameters(
        &self,
        applications: BackingApplications,
        parameters: &Parameters,
    ) -> Result<BackingApplications> {
        if applications
            .iter()
            .all(|app| app.parameters_transformers.is_empty())
        {
            return Ok(applications);
        }

        let mut transformed = Vec::with_capacity(applications.len());
        for application in applications {
            transformed.push(self.transform_application(application, parameters).await?);
        }
        Ok(transformed)
    }

    async fn transform_application(
        &self,
        mut application: BackingApplication,
        parameters: &Parameters,
    ) -> Result<BackingApplication> {
        let specs = application.parameters_transformers.clone();
        for spec in &specs {
            let factory = self
                .registry
                .get(&spec.name)
                .ok_or_else(|| BrokerError::unknown_transformer(&spec.name))?;
            let transformer = factory.create_from_args(&spec.args)?;

            debug!(app = %application.name, transformer = %spec.name, "Applying parameters transformer");
            application = transformer
                .transform(application, parameters)
                .await
                .map_err(|e| match e {
                    BrokerError::Transformation { .. } => e,
                    other => BrokerError::Transformation {
                        name: spec.name.clone(),
                        message: other.to_string(),
                    },
                })?;
        }
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{
        ParametersTransformer, ParametersTransformerFactory, SharedParametersTransformer,
        TransformerFactory,
    };
    use appbroker_types::ParametersTransformerSpec;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Config {
        arg1: Option<String>,
        arg2: Option<i64>,
    }

    /// Records the configs it was built with and the parameters it saw.
    #[derive(Default)]
    struct RecordingFactory {
        name: String,
        configs: Arc<Mutex<Vec<Config>>>,
        parameters: Arc<Mutex<Vec<Parameters>>>,
        append: Option<String>,
    }

    impl RecordingFactory {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                ..Default::default()
            }
        }

        /// Make the transformer append `suffix` to the app's `chain` property.
        fn appending(mut self, suffix: &str) -> Self {
            self.append = Some(suffix.to_string());
            self
        }
    }

    struct Recording {
        parameters: Arc<Mutex<Vec<Parameters>>>,
        append: Option<String>,
    }

    #[async_trait]
    impl ParametersTransformer for Recording {
        async fn transform(
            &self,
            mut application: BackingApplication,
            parameters: &Parameters,
        ) -> Result<BackingApplication> {
            self.parameters.lock().push(parameters.clone());
            if let Some(suffix) = &self.append {
                let chain = application.properties.entry("chain".into()).or_default();
                chain.push_str(suffix);
            }
            Ok(application)
        }
    }

    impl ParametersTransformerFactory for RecordingFactory {
        type Config = Config;

        fn name(&self) -> &str {
            &self.name
        }

        fn create(&self, config: Config) -> SharedParametersTransformer {
            self.configs.lock().push(config);
            Arc::new(Recording {
                parameters: Arc::clone(&self.parameters),
                append: self.append.clone(),
            })
        }
    }

    struct FailingFactory;

    struct Failing;

    #[async_trait]
    impl ParametersTransformer for Failing {
        async fn transform(
            &self,
            _application: BackingApplication,
            _parameters: &Parameters,
        ) -> Result<BackingApplication> {
            Err(BrokerError::Collaborator("lookup service unavailable".into()))
        }
    }

    impl ParametersTransformerFactory for FailingFactory {
        type Config = Config;

        fn name(&self) -> &str {
            "failing"
        }

        fn create(&self, _config: Config) -> SharedParametersTransformer {
            Arc::new(Failing)
        }
    }

    fn shared<F: TransformerFactory + 'static>(factory: Arc<F>) -> Arc<dyn TransformerFactory> {
        factory
    }

    fn service_with(factories: Vec<Arc<dyn TransformerFactory>>) -> ParametersTransformationService {
        let mut registry = TransformerRegistry::new();
        for factory in factories {
            registry.register_arc(factory);
        }
        ParametersTransformationService::new(Arc::new(registry))
    }

    fn parameters() -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert("key1".into(), json!("value1"));
        parameters.insert("key2".into(), json!("value2"));
        parameters
    }

    #[tokio::test]
    async fn test_no_backing_apps() {
        let service = ParametersTransformationService::default();
        let result = service
            .transform_parameters(Vec::new(), &parameters())
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_no_transformers_returns_input() {
        let service = ParametersTransformationService::default();
        let apps = vec![BackingApplication::default(), BackingApplication::new("app", "")];
        let result = service
            .transform_parameters(apps.clone(), &Parameters::new())
            .await
            .unwrap();
        assert_eq!(result, apps);
    }

    #[tokio::test]
    async fn test_unknown_transformer_fails() {
        let service = ParametersTransformationService::default();
        let apps = vec![
            BackingApplication::new("misconfigured-app", "")
                .with_transformer(ParametersTransformerSpec::new("unknown-transformer")),
        ];

        let err = service
            .transform_parameters(apps, &Parameters::new())
            .await
            .unwrap_err();
        assert_eq!(err, BrokerError::unknown_transformer("unknown-transformer"));
    }

    #[tokio::test]
    async fn test_unknown_transformer_aborts_remaining_apps() {
        let factory = Arc::new(RecordingFactory::new("transformer1"));
        let service = service_with(vec![shared(factory.clone())]);
        let apps = vec![
            BackingApplication::new("app1", "")
                .with_transformer(ParametersTransformerSpec::new("missing")),
            BackingApplication::new("app2", "")
                .with_transformer(ParametersTransformerSpec::new("transformer1")),
        ];

        let result = service.transform_parameters(apps, &parameters()).await;
        assert!(matches!(result, Err(BrokerError::Configuration(_))));
        assert!(factory.parameters.lock().is_empty());
    }

    #[tokio::test]
    async fn test_transformers_receive_original_parameters_and_own_config() {
        let factory1 = Arc::new(RecordingFactory::new("transformer1"));
        let factory2 = Arc::new(RecordingFactory::new("transformer2"));
        let service = service_with(vec![shared(factory1.clone()), shared(factory2.clone())]);

        let app1 = BackingApplication::new("app1", "")
            .with_transformer(ParametersTransformerSpec::new("transformer1"));
        let app2 = BackingApplication::new("app2", "")
            .with_transformer(
                ParametersTransformerSpec::new("transformer1")
                    .with_arg("arg1", "value1")
                    .with_arg("arg2", 5),
            )
            .with_transformer(ParametersTransformerSpec::new("transformer2"));
        let apps = vec![app1, app2];

        let result = service
            .transform_parameters(apps.clone(), &parameters())
            .await
            .unwrap();
        assert_eq!(result, apps);

        for seen in factory1
            .parameters
            .lock()
            .iter()
            .chain(factory2.parameters.lock().iter())
        {
            assert_eq!(seen, &parameters());
        }
        assert_eq!(factory1.parameters.lock().len(), 2);
        assert_eq!(factory2.parameters.lock().len(), 1);

        assert_eq!(
            *factory1.configs.lock(),
            vec![
                Config::default(),
                Config {
                    arg1: Some("value1".into()),
                    arg2: Some(5),
                },
            ]
        );
        assert_eq!(*factory2.configs.lock(), vec![Config::default()]);
    }

    #[tokio::test]
    async fn test_chain_threads_application_in_order() {
        let service = service_with(vec![
            shared(Arc::new(RecordingFactory::new("first").appending("a"))),
            shared(Arc::new(RecordingFactory::new("second").appending("b"))),
        ]);
        let apps = vec![
            BackingApplication::new("app", "")
                .with_transformer(ParametersTransformerSpec::new("second"))
                .with_transformer(ParametersTransformerSpec::new("first"))
                .with_transformer(ParametersTransformerSpec::new("second")),
        ];

        let result = service
            .transform_parameters(apps, &Parameters::new())
            .await
            .unwrap();
        assert_eq!(result[0].properties["chain"], "bab");
    }

    #[tokio::test]
    async fn test_transformer_failure_names_transformer() {
        let service = service_with(vec![shared(Arc::new(FailingFactory))]);
        let apps = vec![
            BackingApplication::new("app", "")
                .with_transformer(ParametersTransformerSpec::new("failing")),
        ];

        let err = service
            .transform_parameters(apps, &Parameters::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BrokerError::Transformation {
                name: "failing".into(),
                message: "Collaborator error: lookup service unavailable".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_configuration_errors() {
        let service = service_with(vec![shared(Arc::new(RecordingFactory::new("transformer1")))]);
        let apps = vec![BackingApplication::new("app", "").with_transformer(
            ParametersTransformerSpec::new("transformer1").with_arg("arg2", "five"),
        )];

        let err = service
            .transform_parameters(apps, &Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::Configuration(_)));
    }
}
