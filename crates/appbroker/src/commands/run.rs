//! Run command - dry-run a service instance workflow.

use std::sync::Arc;

use anyhow::Result;
use appbroker_core::{
    AppDeploymentCreateServiceInstanceWorkflow, AppDeploymentDeleteServiceInstanceWorkflow,
    AppDeploymentUpdateServiceInstanceWorkflow, BackingAppDeploymentService,
    BackingServicesProvisionService, DefaultTargetService, ParametersTransformationService,
    PassthroughCredentialProvider, SharedCredentialProvider, SharedTargetService,
    TransformerRegistry, WorkflowDispatcher,
};
use appbroker_types::{
    CreateServiceInstanceRequest, DeleteServiceInstanceRequest, Parameters, Plan,
    ServiceDefinition, UpdateServiceInstanceRequest,
};
use clap::{Args, ValueEnum};
use serde_json::Value;
use uuid::Uuid;

use super::Context;
use crate::dry_run::DryRunDeployer;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Operation to run
    #[arg(value_enum)]
    pub action: Action,

    /// Service definition name
    #[arg(long)]
    pub service: String,

    /// Plan name
    #[arg(long)]
    pub plan: String,

    /// Service instance id (random when omitted)
    #[arg(long)]
    pub instance_id: Option<String>,

    /// Request parameter as key=value; values are parsed as JSON when possible
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let max_concurrency = loaded.config.broker.max_concurrency;
    let catalog = Arc::new(loaded.config.catalog());

    let deployer = Arc::new(DryRunDeployer::new());
    let provision = BackingServicesProvisionService::new(deployer.clone())
        .with_max_concurrency(max_concurrency);
    let deployment =
        BackingAppDeploymentService::new(deployer.clone()).with_max_concurrency(max_concurrency);
    let parameters =
        ParametersTransformationService::new(Arc::new(TransformerRegistry::with_builtins()));
    let credentials: SharedCredentialProvider = Arc::new(PassthroughCredentialProvider);
    let targets: SharedTargetService = Arc::new(DefaultTargetService);

    let dispatcher = WorkflowDispatcher::new()
        .with_create_workflow(Arc::new(AppDeploymentCreateServiceInstanceWorkflow::new(
            Arc::clone(&catalog),
            provision.clone(),
            deployment.clone(),
            parameters.clone(),
            Arc::clone(&credentials),
            Arc::clone(&targets),
        )))
        .with_update_workflow(Arc::new(AppDeploymentUpdateServiceInstanceWorkflow::new(
            Arc::clone(&catalog),
            provision.clone(),
            deployment.clone(),
            parameters,
            Arc::clone(&targets),
        )))
        .with_delete_workflow(Arc::new(AppDeploymentDeleteServiceInstanceWorkflow::new(
            catalog,
            provision,
            deployment,
            credentials,
            targets,
        )));

    let service_instance_id = args
        .instance_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let service_definition = ServiceDefinition::new(args.service.clone(), args.service);
    let plan = Plan::new(args.plan.clone(), args.plan);
    let request_parameters: Parameters = args.params.into_iter().collect();

    let operation = match args.action {
        Action::Create => {
            dispatcher
                .create(CreateServiceInstanceRequest {
                    service_instance_id: service_instance_id.clone(),
                    service_definition,
                    plan,
                    parameters: request_parameters,
                })
                .await?
        }
        Action::Update => {
            dispatcher
                .update(UpdateServiceInstanceRequest {
                    service_instance_id: service_instance_id.clone(),
                    service_definition,
                    plan,
                    parameters: request_parameters,
                })
                .await?
        }
        Action::Delete => {
            dispatcher
                .delete(DeleteServiceInstanceRequest {
                    service_instance_id: service_instance_id.clone(),
                    service_definition,
                    plan,
                })
                .await?
        }
    };

    let response = operation.response().clone();
    operation.wait().await?;
    let calls = deployer.calls();

    if ctx.json_output {
        let output = serde_json::json!({
            "service_instance_id": service_instance_id,
            "response": response,
            "calls": calls,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Service instance: {service_instance_id}");
    println!("Async response:   {}", response.is_async);
    if calls.is_empty() {
        println!("No deployer calls");
    }
    for call in &calls {
        println!("  {:<24} {:<24} {}", call.action, call.name, call.id);
    }
    Ok(())
}

/// Parse `key=value`. The value is JSON when it parses as JSON, else a string.
fn parse_param(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
