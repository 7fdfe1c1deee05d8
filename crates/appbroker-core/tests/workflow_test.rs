//! Integration tests for the app deployment workflows.

mod common;

use std::sync::Arc;

use appbroker_core::{
    AppDeploymentCreateServiceInstanceWorkflow, AppDeploymentDeleteServiceInstanceWorkflow,
    AppDeploymentUpdateServiceInstanceWorkflow, BrokerError, CreateServiceInstanceWorkflow,
    DefaultTargetService, DeleteServiceInstanceWorkflow, PassthroughCredentialProvider,
    UpdateServiceInstanceWorkflow,
};
use appbroker_types::{
    BackingApplication, BackingService, BrokeredService, BrokeredServices,
    CreateServiceInstanceRequest, DeleteServiceInstanceRequest, Parameters,
    ParametersTransformerSpec, ServiceInstanceResponse, TargetSpec, UpdateServiceInstanceRequest,
};
use common::{Harness, RecordingDeployer, plan, service_definition};

fn catalog() -> Arc<BrokeredServices> {
    let mut standard = BrokeredService::new("mysql", "standard");
    standard.services = vec![
        BackingService::new("db1", "mysql", "small"),
        BackingService::new("db2", "mysql", "small"),
    ];
    standard.apps = vec![
        BackingApplication::new("app1", "app1.jar").with_service("db1"),
        BackingApplication::new("app2", "app2.jar").with_service("db2"),
    ];
    standard.target = Some(TargetSpec::new("SpacePerServiceInstance"));

    let mut apps_only = BrokeredService::new("mysql", "apps-only");
    apps_only.apps = vec![BackingApplication::new("app1", "app1.jar")];

    let mut misconfigured = BrokeredService::new("mysql", "misconfigured");
    misconfigured.services = vec![BackingService::new("db1", "mysql", "small")];
    misconfigured.apps = vec![
        BackingApplication::new("app1", "app1.jar")
            .with_transformer(ParametersTransformerSpec::new("NoSuchTransformer")),
    ];

    Arc::new(BrokeredServices::new(vec![standard, apps_only, misconfigured]))
}

fn delete_request(plan_name: &str) -> DeleteServiceInstanceRequest {
    DeleteServiceInstanceRequest {
        service_instance_id: "si-1".into(),
        service_definition: service_definition(),
        plan: plan(plan_name),
    }
}

fn create_request(plan_name: &str) -> CreateServiceInstanceRequest {
    CreateServiceInstanceRequest {
        service_instance_id: "si-1".into(),
        service_definition: service_definition(),
        plan: plan(plan_name),
        parameters: Parameters::new(),
    }
}

fn update_request(plan_name: &str) -> UpdateServiceInstanceRequest {
    UpdateServiceInstanceRequest {
        service_instance_id: "si-1".into(),
        service_definition: service_definition(),
        plan: plan(plan_name),
        parameters: Parameters::new(),
    }
}

fn delete_workflow(h: &Harness) -> AppDeploymentDeleteServiceInstanceWorkflow {
    AppDeploymentDeleteServiceInstanceWorkflow::new(
        catalog(),
        h.provision.clone(),
        h.deployment.clone(),
        h.credentials.clone(),
        h.targets.clone(),
    )
}

fn create_workflow(h: &Harness) -> AppDeploymentCreateServiceInstanceWorkflow {
    AppDeploymentCreateServiceInstanceWorkflow::new(
        catalog(),
        h.provision.clone(),
        h.deployment.clone(),
        h.parameters.clone(),
        h.credentials.clone(),
        h.targets.clone(),
    )
}

fn update_workflow(h: &Harness) -> AppDeploymentUpdateServiceInstanceWorkflow {
    AppDeploymentUpdateServiceInstanceWorkflow::new(
        catalog(),
        h.provision.clone(),
        h.deployment.clone(),
        h.parameters.clone(),
        h.targets.clone(),
    )
}

fn sorted(entries: &[String]) -> Vec<String> {
    let mut entries = entries.to_vec();
    entries.sort();
    entries
}

#[tokio::test]
async fn test_delete_runs_stages_in_order() {
    let h = Harness::new();
    delete_workflow(&h)
        .delete(&delete_request("standard"))
        .await
        .unwrap();

    let calls = h.log.entries();
    assert_eq!(calls.len(), 7, "calls: {calls:?}");
    assert_eq!(calls[0], "target.services si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[1..3]),
        vec![
            "deployer.delete_service_instance db1",
            "deployer.delete_service_instance db2",
        ]
    );
    assert_eq!(calls[3], "credentials.delete si-1");
    assert_eq!(calls[4], "target.apps si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[5..7]),
        vec![
            "deployer.undeploy_application app1",
            "deployer.undeploy_application app2",
        ]
    );
}

#[tokio::test]
async fn test_delete_deprovision_failure_aborts_application_stages() {
    let h = Harness::with_deployer(|log| RecordingDeployer::new(log).failing_on("db2"));
    let err = delete_workflow(&h)
        .delete(&delete_request("standard"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BrokerError::Deployer("delete_service_instance failed for db2".into())
    );
    let calls = h.log.entries();
    assert!(
        calls
            .iter()
            .all(|c| !c.starts_with("credentials") && !c.starts_with("target.apps")),
        "calls: {calls:?}"
    );
    assert!(!calls.iter().any(|c| c.contains("undeploy")));
}

#[tokio::test]
async fn test_delete_unknown_offering_calls_nothing() {
    let h = Harness::new();
    delete_workflow(&h)
        .delete(&delete_request("premium"))
        .await
        .unwrap();
    assert!(h.log.entries().is_empty());
}

#[tokio::test]
async fn test_delete_without_backing_services_skips_deprovision() {
    let h = Harness::new();
    delete_workflow(&h)
        .delete(&delete_request("apps-only"))
        .await
        .unwrap();

    assert_eq!(
        h.log.entries(),
        vec![
            "credentials.delete si-1",
            "target.apps si-1 -",
            "deployer.undeploy_application app1",
        ]
    );
}

#[tokio::test]
async fn test_accept_only_configured_offering() {
    let h = Harness::new();
    let workflow = delete_workflow(&h);
    assert!(workflow.accept(&delete_request("standard")).await);
    assert!(!workflow.accept(&delete_request("premium")).await);

    let mut other_service = delete_request("standard");
    other_service.service_definition.name = "redis".into();
    assert!(!workflow.accept(&other_service).await);
}

#[tokio::test]
async fn test_responses_are_async_and_describe_the_operation() {
    let h = Harness::new();
    let response = delete_workflow(&h)
        .build_response(&delete_request("standard"), ServiceInstanceResponse::builder())
        .await
        .unwrap()
        .build();
    assert!(response.is_async);
    assert_eq!(response.operation.as_deref(), Some("deleting"));

    let response = create_workflow(&h)
        .build_response(&create_request("standard"), ServiceInstanceResponse::builder())
        .await
        .unwrap()
        .build();
    assert!(response.is_async);
    assert_eq!(response.operation.as_deref(), Some("creating"));

    let response = update_workflow(&h)
        .build_response(&update_request("standard"), ServiceInstanceResponse::builder())
        .await
        .unwrap()
        .build();
    assert!(response.is_async);
    assert_eq!(response.operation.as_deref(), Some("updating"));
}

#[tokio::test]
async fn test_create_provisions_services_before_deploying() {
    let h = Harness::new();
    create_workflow(&h)
        .create(&create_request("standard"))
        .await
        .unwrap();

    let calls = h.log.entries();
    assert_eq!(calls.len(), 7, "calls: {calls:?}");
    assert_eq!(calls[0], "target.services si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[1..3]),
        vec![
            "deployer.create_service_instance db1",
            "deployer.create_service_instance db2",
        ]
    );
    assert_eq!(calls[3], "credentials.add si-1");
    assert_eq!(calls[4], "target.apps si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[5..7]),
        vec![
            "deployer.deploy_application app1",
            "deployer.deploy_application app2",
        ]
    );
}

#[tokio::test]
async fn test_create_with_guid_suffix_target() {
    let h = Harness::new();
    let workflow = AppDeploymentCreateServiceInstanceWorkflow::new(
        {
            let mut entry = BrokeredService::new("mysql", "standard");
            entry.services = vec![BackingService::new("db1", "mysql", "small")];
            entry.apps = vec![BackingApplication::new("app1", "app1.jar").with_service("db1")];
            entry.target = Some(TargetSpec::new("ServiceInstanceGuidSuffix"));
            Arc::new(BrokeredServices::new(vec![entry]))
        },
        h.provision.clone(),
        h.deployment.clone(),
        h.parameters.clone(),
        Arc::new(PassthroughCredentialProvider),
        Arc::new(DefaultTargetService),
    );

    workflow.create(&create_request("standard")).await.unwrap();
    assert_eq!(
        h.log.entries(),
        vec![
            "deployer.create_service_instance db1-si-1",
            "deployer.deploy_application app1-si-1",
        ]
    );
}

#[tokio::test]
async fn test_create_unknown_transformer_stops_before_deploy() {
    let h = Harness::new();
    let err = create_workflow(&h)
        .create(&create_request("misconfigured"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BrokerError::Configuration("unknown parameters transformer 'NoSuchTransformer'".into())
    );
    assert_eq!(
        h.log.entries(),
        vec![
            "target.services si-1 -",
            "deployer.create_service_instance db1",
        ]
    );
}

#[tokio::test]
async fn test_update_redeploys_without_touching_credentials() {
    let h = Harness::new();
    update_workflow(&h)
        .update(&update_request("standard"))
        .await
        .unwrap();

    let calls = h.log.entries();
    assert_eq!(calls.len(), 6, "calls: {calls:?}");
    assert_eq!(calls[0], "target.services si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[1..3]),
        vec![
            "deployer.update_service_instance db1",
            "deployer.update_service_instance db2",
        ]
    );
    assert_eq!(calls[3], "target.apps si-1 SpacePerServiceInstance");
    assert_eq!(
        sorted(&calls[4..6]),
        vec![
            "deployer.update_application app1",
            "deployer.update_application app2",
        ]
    );
}
