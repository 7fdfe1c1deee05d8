//! Fan-out/fan-in execution shared by service provisioning and app deployment.
//!
//! Every element of a collection is dispatched as its own tokio task. Results
//! are collected in completion order; the first failure ends the stage
//! immediately. Siblings still in flight are detached rather than aborted,
//! so external calls already dispatched run to their own completion and
//! their results are discarded.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{BrokerError, Result};

/// The kind of fan-out operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateServiceInstances,
    UpdateServiceInstances,
    DeleteServiceInstances,
    DeployApplications,
    UpdateApplications,
    UndeployApplications,
}

impl Operation {
    /// Stable identifier, used as a structured log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateServiceInstances => "create_service_instances",
            Operation::UpdateServiceInstances => "update_service_instances",
            Operation::DeleteServiceInstances => "delete_service_instances",
            Operation::DeployApplications => "deploy_applications",
            Operation::UpdateApplications => "update_applications",
            Operation::UndeployApplications => "undeploy_applications",
        }
    }

    /// Human-readable progressive form, e.g. "creating backing services".
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::CreateServiceInstances => "creating backing services",
            Operation::UpdateServiceInstances => "updating backing services",
            Operation::DeleteServiceInstances => "deleting backing services",
            Operation::DeployApplications => "deploying backing applications",
            Operation::UpdateApplications => "updating backing applications",
            Operation::UndeployApplications => "undeploying backing applications",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observer notified at the checkpoints of a fan-out operation.
///
/// `targets` is a description of the whole input collection. Observers
/// cannot influence the outcome of the operation.
pub trait ProvisionObserver: Send + Sync {
    /// Once, before any element is dispatched.
    fn requested(&self, operation: Operation, targets: &str);

    /// Once per element that completed successfully.
    fn completed(&self, operation: Operation, id: &str);

    /// Once, after every element completed successfully.
    fn complete(&self, operation: Operation, targets: &str);

    /// Once, when the first element failed.
    fn failed(&self, operation: Operation, targets: &str, error: &BrokerError);
}

/// Shared observer type.
pub type SharedProvisionObserver = Arc<dyn ProvisionObserver>;

/// Default observer that reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProvisionObserver for TracingObserver {
    fn requested(&self, operation: Operation, targets: &str) {
        info!(operation = %operation, targets = %targets, "Started {}", operation.describe());
    }

    fn completed(&self, operation: Operation, id: &str) {
        debug!(operation = %operation, id = %id, "Finished {} element", operation.describe());
    }

    fn complete(&self, operation: Operation, targets: &str) {
        info!(operation = %operation, targets = %targets, "Finished {}", operation.describe());
    }

    fn failed(&self, operation: Operation, targets: &str, error: &BrokerError) {
        error!(
            operation = %operation,
            targets = %targets,
            error = %error,
            "Error {} with error '{}'",
            operation.describe(),
            error
        );
    }
}

/// Dispatch `call` for every item concurrently and join the results.
///
/// `max_concurrency` caps the number of calls in flight; `None` dispatches
/// everything at once. Returns one id per item in completion order, or the
/// first error.
pub(crate) async fn fan_out<T, F, Fut>(
    operation: Operation,
    items: Vec<T>,
    targets: String,
    max_concurrency: Option<usize>,
    observer: &dyn ProvisionObserver,
    call: F,
) -> Result<Vec<String>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    observer.requested(operation, &targets);

    let limiter = max_concurrency.map(|permits| Arc::new(Semaphore::new(permits.max(1))));
    let mut tasks = JoinSet::new();
    for item in items {
        let pending = call(item);
        let limiter = limiter.clone();
        tasks.spawn(async move {
            let _permit = match limiter {
                Some(limiter) => Some(
                    limiter
                        .acquire_owned()
                        .await
                        .map_err(|e| BrokerError::Task(e.to_string()))?,
                ),
                None => None,
            };
            pending.await
        });
    }

    let mut ids = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined.map_err(BrokerError::from).and_then(|outcome| outcome) {
            Ok(id) => {
                observer.completed(operation, &id);
                ids.push(id);
            }
            Err(err) => {
                observer.failed(operation, &targets, &err);
                // Queued elements must not start once the stage has failed.
                if let Some(limiter) = &limiter {
                    limiter.close();
                }
                tasks.detach_all();
                return Err(err);
            }
        }
    }

    observer.complete(operation, &targets);
    Ok(ids)
}

/// Join element names into a single description for observers.
pub(crate) fn describe<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    format!("[{}]", names.join(", "))
}
