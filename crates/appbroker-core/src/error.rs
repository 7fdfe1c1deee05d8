//! Error types for the orchestration core.

use thiserror::Error;

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, BrokerError>;

/// Errors surfaced to the broker protocol layer.
///
/// None of these are retried inside the core; each is terminal for the
/// operation that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BrokerError {
    /// Unknown parameters transformer, or arguments that don't bind to its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A parameters transformer failed while transforming an application.
    #[error("Parameters transformer '{name}' failed: {message}")]
    Transformation { name: String, message: String },

    /// The platform deployer rejected or failed a call.
    #[error("Deployer error: {0}")]
    Deployer(String),

    /// Catalog, target or credential collaborator failure.
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    /// No registered workflow accepts the request.
    #[error("No {operation} workflow accepts service '{service}' plan '{plan}'")]
    NoWorkflow {
        operation: &'static str,
        service: String,
        plan: String,
    },

    /// A spawned task panicked or was cancelled before reporting.
    #[error("Task error: {0}")]
    Task(String),
}

impl BrokerError {
    /// Error for a transformer name with no registered factory.
    pub fn unknown_transformer(name: &str) -> Self {
        BrokerError::Configuration(format!("unknown parameters transformer '{name}'"))
    }
}

impl From<tokio::task::JoinError> for BrokerError {
    fn from(err: tokio::task::JoinError) -> Self {
        BrokerError::Task(err.to_string())
    }
}
