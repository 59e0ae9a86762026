//! Integration tests for the full synthesis pipeline over the e-commerce fixture.

use std::fs;
use std::path::Path;

use mockall::mock;
use tempfile::TempDir;

use weave_core::{
    JsonFileEmitter, PlanDeclaration, PlanEmitter, SynthError, SynthResult, SynthesizedPlan,
    Synthesizer,
};
use weave_graph::{GraphError, StackDeclaration};
use weave_model::{AttributeValue, CapabilityValue, ResourceKind, Teardown};
use weave_wiring::{HealthCheck, UpstreamProtocol, WiringError};

mock! {
    pub Emitter {}

    impl PlanEmitter for Emitter {
        fn emit(&mut self, plan: &SynthesizedPlan) -> SynthResult<()>;
    }
}

fn fixture() -> PlanDeclaration {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ecommerce.yaml");
    PlanDeclaration::from_file(&path).unwrap()
}

fn synthesize(declaration: &PlanDeclaration) -> SynthResult<SynthesizedPlan> {
    Synthesizer::new().synthesize(declaration)
}

fn position(plan: &SynthesizedPlan, stack: &str) -> usize {
    plan.order.iter().position(|s| s == stack).unwrap()
}

#[test]
fn test_ecommerce_order_and_waves() {
    let plan = synthesize(&fixture()).unwrap();

    assert_eq!(plan.order.len(), 6);
    assert_eq!(plan.order[0], "Vpc");
    for stack in ["Cluster", "Nlb", "Ecr"] {
        assert!(position(&plan, stack) < position(&plan, "ProductsService"));
    }
    assert!(position(&plan, "Nlb") < position(&plan, "Api"));
    assert!(position(&plan, "ProductsService") < position(&plan, "Api"));

    assert_eq!(
        plan.order,
        vec!["Vpc", "Ecr", "Cluster", "Nlb", "ProductsService", "Api"]
    );
    assert_eq!(plan.waves[0], vec!["Vpc"]);
    assert_eq!(plan.waves[1], vec!["Ecr", "Cluster", "Nlb"]);
    assert_eq!(plan.waves[2], vec!["ProductsService"]);
    assert_eq!(plan.waves[3], vec!["Api"]);
}

#[test]
fn test_resolved_references_and_tags() {
    let plan = synthesize(&fixture()).unwrap();

    let products = plan.stack("ProductsService").unwrap();
    assert_eq!(products.tags["cost"], "ProductsService");
    assert_eq!(products.tags["team"], "KucharskiCode");
    assert_eq!(plan.stack("Vpc").unwrap().tags["cost"], "EcommerceInfra");

    let listener = products.resource("NlbListener").unwrap();
    let nlb = &listener.references["nlb"];
    assert_eq!(nlb.export, "Nlb.nlb");
    assert!(matches!(&nlb.value, CapabilityValue::NetworkEndpoint(e) if e.port == 8080));

    let task = products.resource("TaskDefinition").unwrap();
    assert_eq!(task.references["repository"].export, "Ecr.productsServiceRepository");
    assert_eq!(task.containers.len(), 2);
    assert_eq!(task.containers[0].environment["SERVER_PORT"], "8080");
    assert!(!task.containers[1].essential);

    let group = products.resource("ServiceSecurityGroup").unwrap();
    assert_eq!(group.ingress[0].port, 8080);
    assert_eq!(group.references["vpc"].export, "Vpc.vpc");
}

#[test]
fn test_lifecycle_defaults() {
    let plan = synthesize(&fixture()).unwrap();

    let logs = plan.stack("Api").unwrap().resource("ECommerceApiLogs").unwrap();
    let settings = logs.lifecycle.unwrap();
    assert_eq!(settings.teardown, Teardown::Destroy);
    assert_eq!(settings.retention_days, Some(30));

    let table = plan.stack("ProductsService").unwrap().resource("ProductsDdb").unwrap();
    assert_eq!(table.kind, ResourceKind::DataTable);
    assert_eq!(table.lifecycle.unwrap().teardown, Teardown::Destroy);

    let repository = plan.stack("Ecr").unwrap().resource("ProductsServiceRepository").unwrap();
    assert_eq!(repository.lifecycle.unwrap().teardown, Teardown::Retain);
}

#[test]
fn test_route_wiring() {
    let plan = synthesize(&fixture()).unwrap();

    assert_eq!(plan.routes.len(), 5);
    for route in &plan.routes {
        assert_eq!(route.upstream, UpstreamProtocol::HttpProxy);
        assert_eq!(route.integration_parameters.len(), route.path_parameters.len() + 1);
    }

    let get_one = plan.route("GET /products/{id}").unwrap();
    assert_eq!(
        get_one.integration_uri,
        "http://ECommerceNlb-0a1b2c3d.elb.eu-north-1.amazonaws.com:8080/api/products/{id}"
    );
    assert_eq!(
        get_one.integration_parameters["integration.request.path.id"],
        "method.request.path.id"
    );

    let post = plan.route("POST /products").unwrap();
    assert_eq!(post.integration_parameters.len(), 1);
}

#[test]
fn test_route_table() {
    let plan = synthesize(&fixture()).unwrap();
    let expected = "\
| Method | Path template | Upstream protocol | Path params | Injected headers |
|---|---|---|---|---|
| GET | /products | HTTP proxy | none | requestId |
| POST | /products | HTTP proxy | none | requestId |
| GET/PUT/DELETE | /products/{id} | HTTP proxy | id | requestId |
";
    assert_eq!(plan.route_table.to_string(), expected);
}

#[test]
fn test_api_route_descriptors() {
    let plan = synthesize(&fixture()).unwrap();
    let api = plan.stack("Api").unwrap();

    let routes: Vec<_> = api
        .resources
        .iter()
        .filter(|r| r.kind == ResourceKind::ApiRoute)
        .collect();
    assert_eq!(routes.len(), 5);

    let delete = api.resource("DELETE /products/{id}").unwrap();
    assert_eq!(delete.attributes["api"], AttributeValue::from("RestApi"));
    assert_eq!(delete.attributes["backend_path"], AttributeValue::from("/api/products/{id}"));
    assert_eq!(delete.references["products"].export, "ProductsService.service");
    assert_eq!(delete.references["vpcLink"].export, "Nlb.vpcLink");
}

#[test]
fn test_target_registration() {
    let plan = synthesize(&fixture()).unwrap();
    assert_eq!(plan.target_groups.len(), 2);

    let alb = &plan.target_groups[0];
    assert_eq!(alb.target_group, "productsServiceAlb");
    assert_eq!(alb.targets.len(), 2);
    match &alb.health_check {
        HealthCheck::Http { path, port, .. } => {
            assert_eq!(path, "/actuator/health");
            assert_eq!(*port, 8080);
        }
        other => panic!("unexpected health check: {other:?}"),
    }

    let nlb = &plan.target_groups[1];
    assert_eq!(nlb.target_group, "productsServiceNlb");
    assert_eq!(nlb.targets.len(), 2);
    assert_eq!(nlb.deregistration_delay_secs, 30);
    assert!(matches!(nlb.health_check, HealthCheck::TcpConnect { .. }));
}

fn products_stack(declaration: &mut PlanDeclaration) -> &mut StackDeclaration {
    declaration
        .stacks
        .iter_mut()
        .find(|s| s.name == "ProductsService")
        .unwrap()
}

fn set_export_replicas(declaration: &mut PlanDeclaration, count: u32) {
    if let CapabilityValue::ComputeService(service) = &mut products_stack(declaration).exports[0].value {
        service.desired_count = count;
    }
}

#[test]
fn test_zero_replicas_leave_groups_empty() {
    let mut declaration = fixture();
    set_export_replicas(&mut declaration, 0);
    let service = products_stack(&mut declaration)
        .resources
        .iter_mut()
        .find(|r| r.id == "Service")
        .unwrap();
    service.attributes.insert("desired_count".to_string(), 0i64.into());

    let plan = synthesize(&declaration).unwrap();
    assert_eq!(plan.target_groups.len(), 2);
    assert!(plan.target_groups.iter().all(|g| g.targets.is_empty()));
}

#[test]
fn test_service_export_must_match_descriptors() {
    let mut declaration = fixture();
    set_export_replicas(&mut declaration, 3);
    match synthesize(&declaration).unwrap_err() {
        SynthError::Graph(GraphError::InvalidStack { stack, source }) => {
            assert_eq!(stack, "ProductsService");
            assert!(source.to_string().contains("3 replicas"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut declaration = fixture();
    if let CapabilityValue::ComputeService(service) = &mut products_stack(&mut declaration).exports[0].value {
        service.container_port = 9090;
    }
    assert!(matches!(
        synthesize(&declaration).unwrap_err(),
        SynthError::Graph(GraphError::InvalidStack { .. })
    ));
}

#[test]
fn test_backend_owner_must_exist() {
    let mut declaration = fixture();
    declaration.stacks.retain(|s| s.name != "Api");

    match synthesize(&declaration).unwrap_err() {
        SynthError::UnknownReference { what, reference, .. } => {
            assert_eq!(what, "stack");
            assert_eq!(reference, "Api");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unbound_placeholder_emits_nothing() {
    let mut declaration = fixture();
    declaration.routes[2].route.backend_path = "/api/products".to_string();

    let mut emitter = MockEmitter::new();
    emitter.expect_emit().times(0);

    let err = Synthesizer::new()
        .synthesize_and_emit(&declaration, &mut emitter)
        .unwrap_err();
    match err {
        SynthError::Wiring(WiringError::UnboundPlaceholder { route, hop, placeholder }) => {
            assert_eq!(route, "GET /products/{id}");
            assert_eq!(hop, "ECommerceVpcLink");
            assert_eq!(placeholder, "id");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_ambiguous_endpoint_without_disambiguation() {
    let mut declaration = fixture();
    let products = declaration
        .stacks
        .iter_mut()
        .find(|s| s.name == "ProductsService")
        .unwrap();
    let slot = products.requires.iter_mut().find(|r| r.slot == "nlb").unwrap();
    slot.producer = None;
    slot.export = None;

    let mut emitter = MockEmitter::new();
    emitter.expect_emit().times(0);

    let err = Synthesizer::new()
        .synthesize_and_emit(&declaration, &mut emitter)
        .unwrap_err();
    match err {
        SynthError::Graph(GraphError::AmbiguousCapability { consumer, candidates, .. }) => {
            assert_eq!(consumer, "ProductsService");
            assert_eq!(candidates, vec!["Nlb.nlb", "Nlb.alb"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_descriptor_fails_its_stack() {
    let mut declaration = fixture();
    let products = declaration
        .stacks
        .iter_mut()
        .find(|s| s.name == "ProductsService")
        .unwrap();
    let task = products
        .resources
        .iter_mut()
        .find(|r| r.id == "TaskDefinition")
        .unwrap();
    task.attributes.insert("cpu".to_string(), 300i64.into());

    let err = synthesize(&declaration).unwrap_err();
    match err {
        SynthError::Graph(GraphError::InvalidStack { stack, .. }) => {
            assert_eq!(stack, "ProductsService");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_plan_json_is_deterministic() {
    let first = synthesize(&fixture()).unwrap().to_json().unwrap();
    let second = synthesize(&fixture()).unwrap().to_json().unwrap();
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["order"][0], "Vpc");
    assert_eq!(value["routes"].as_array().unwrap().len(), 5);
}

#[test]
fn test_json_file_emitter() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("plan.json");
    let mut emitter = JsonFileEmitter::new(&path);

    let plan = Synthesizer::new()
        .synthesize_and_emit(&fixture(), &mut emitter)
        .unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, format!("{}\n", plan.to_json().unwrap()));
}

#[test]
fn test_toml_declaration() {
    let toml = r#"
[environment]
account = "199840700690"
region = "eu-north-1"

[tags]
team = "KucharskiCode"

[lifecycle.log_group]
teardown = "retain"
retention_days = 90

[[stacks]]
name = "Cluster"

[[stacks.requires]]
slot = "vpc"
capability = "network_fabric"

[[stacks.resources]]
id = "Cluster"
kind = "compute_cluster"
references = ["vpc"]

[stacks.resources.attributes]
name = "ECommerceCluster"

[[stacks.resources]]
id = "ClusterLogs"
kind = "log_group"

[stacks.resources.attributes]
name = "ClusterLogs"

[[stacks]]
name = "Vpc"

[[stacks.exports]]
name = "vpc"

[stacks.exports.value]
type = "network_fabric"
id = "ECommerceVpc"
"#;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.toml");
    fs::write(&path, toml).unwrap();

    let declaration = PlanDeclaration::from_file(&path).unwrap();
    let plan = synthesize(&declaration).unwrap();
    assert_eq!(plan.order, vec!["Vpc", "Cluster"]);

    let logs = plan.stack("Cluster").unwrap().resource("ClusterLogs").unwrap();
    let settings = logs.lifecycle.unwrap();
    assert_eq!(settings.teardown, Teardown::Retain);
    assert_eq!(settings.retention_days, Some(90));
}
