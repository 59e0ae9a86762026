//! Resource descriptors: immutable, validated descriptions of one
//! provisionable unit.
//!
//! Every kind has its own validation rule set; construction either returns a
//! descriptor that satisfies it or a [`ModelError::ConfigurationValidation`]
//! naming the descriptor and the broken rule.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeValue, ListenerKind, Protocol};
use crate::capability::{CapabilityReference, CapabilityType};
use crate::container::{validate_containers, ContainerDefinition};
use crate::error::{ModelError, ModelResult};
use crate::lifecycle::LifecycleSettings;
use crate::security::{validate_ingress, IngressRule};

/// CPU units a container task may reserve.
pub const TASK_CPU_UNITS: &[i64] = &[256, 512, 1024, 2048, 4096];

/// Methods accepted on an API route.
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "ANY"];

/// Longest name a target group may carry.
pub const MAX_TARGET_GROUP_NAME: usize = 32;

/// Closed set of provisionable resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    NetworkFabric,
    ComputeCluster,
    ImageRepository,
    DataTable,
    ContainerTaskDefinition,
    ContainerService,
    LoadBalancer,
    Listener,
    TargetGroup,
    PrivateLink,
    SecurityGroup,
    LogGroup,
    RestApi,
    ApiRoute,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::NetworkFabric => "network_fabric",
            ResourceKind::ComputeCluster => "compute_cluster",
            ResourceKind::ImageRepository => "image_repository",
            ResourceKind::DataTable => "data_table",
            ResourceKind::ContainerTaskDefinition => "container_task_definition",
            ResourceKind::ContainerService => "container_service",
            ResourceKind::LoadBalancer => "load_balancer",
            ResourceKind::Listener => "listener",
            ResourceKind::TargetGroup => "target_group",
            ResourceKind::PrivateLink => "private_link",
            ResourceKind::SecurityGroup => "security_group",
            ResourceKind::LogGroup => "log_group",
            ResourceKind::RestApi => "rest_api",
            ResourceKind::ApiRoute => "api_route",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            ResourceKind::NetworkFabric,
            ResourceKind::ComputeCluster,
            ResourceKind::ImageRepository,
            ResourceKind::DataTable,
            ResourceKind::ContainerTaskDefinition,
            ResourceKind::ContainerService,
            ResourceKind::LoadBalancer,
            ResourceKind::Listener,
            ResourceKind::TargetGroup,
            ResourceKind::PrivateLink,
            ResourceKind::SecurityGroup,
            ResourceKind::LogGroup,
            ResourceKind::RestApi,
            ResourceKind::ApiRoute,
        ]
    }

    /// Attributes that must be present.
    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::NetworkFabric => &["name"],
            ResourceKind::ComputeCluster => &["name"],
            ResourceKind::ImageRepository => &["name"],
            ResourceKind::DataTable => &["name", "partition_key"],
            ResourceKind::ContainerTaskDefinition => &["family", "cpu", "memory_mib"],
            ResourceKind::ContainerService => &["name", "desired_count", "task_definition"],
            ResourceKind::LoadBalancer => &["name", "kind"],
            ResourceKind::Listener => &["port", "protocol", "kind"],
            ResourceKind::TargetGroup => &["name", "port", "protocol", "deregistration_delay"],
            ResourceKind::PrivateLink => &["name"],
            ResourceKind::SecurityGroup => &["name"],
            ResourceKind::LogGroup => &["name"],
            ResourceKind::RestApi => &["name"],
            ResourceKind::ApiRoute => &["method", "path"],
        }
    }

    /// Capability types a descriptor of this kind must reference.
    pub fn required_capabilities(&self) -> &'static [CapabilityType] {
        match self {
            ResourceKind::ComputeCluster | ResourceKind::LoadBalancer | ResourceKind::SecurityGroup => {
                &[CapabilityType::NetworkFabric]
            }
            ResourceKind::ContainerTaskDefinition => &[CapabilityType::ImageRepository],
            ResourceKind::ContainerService => &[CapabilityType::ComputeCluster],
            _ => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A descriptor as written in a declaration, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDeclaration {
    pub id: String,
    pub kind: ResourceKind,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub references: Vec<CapabilityReference>,
    /// Containers of a task definition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerDefinition>,
    /// Ingress rules of a security group.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<IngressRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleSettings>,
}

impl DescriptorDeclaration {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            attributes: BTreeMap::new(),
            references: Vec::new(),
            containers: Vec::new(),
            ingress: Vec::new(),
            lifecycle: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn reference(mut self, name: impl Into<String>) -> Self {
        self.references.push(CapabilityReference::new(name));
        self
    }

    pub fn container(mut self, container: ContainerDefinition) -> Self {
        self.containers.push(container);
        self
    }

    pub fn ingress(mut self, rule: IngressRule) -> Self {
        self.ingress.push(rule);
        self
    }

    pub fn lifecycle(mut self, settings: LifecycleSettings) -> Self {
        self.lifecycle = Some(settings);
        self
    }

    /// Validate and freeze into a descriptor.
    pub fn build(self) -> ModelResult<ResourceDescriptor> {
        validate(&self)?;
        if let Some(settings) = self.lifecycle {
            settings.validate(&self.id)?;
        }
        Ok(ResourceDescriptor {
            id: self.id,
            kind: self.kind,
            attributes: self.attributes,
            references: self.references,
            containers: self.containers,
            ingress: self.ingress,
            lifecycle_override: self.lifecycle,
            lifecycle: None,
        })
    }
}

/// A validated, immutable resource descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    id: String,
    kind: ResourceKind,
    attributes: BTreeMap<String, AttributeValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    references: Vec<CapabilityReference>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    containers: Vec<ContainerDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ingress: Vec<IngressRule>,
    #[serde(skip)]
    lifecycle_override: Option<LifecycleSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lifecycle: Option<LifecycleSettings>,
}

impl ResourceDescriptor {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    pub fn references(&self) -> &[CapabilityReference] {
        &self.references
    }

    pub fn containers(&self) -> &[ContainerDefinition] {
        &self.containers
    }

    pub fn container(&self, name: &str) -> Option<&ContainerDefinition> {
        self.containers.iter().find(|c| c.name == name)
    }

    pub fn ingress(&self) -> &[IngressRule] {
        &self.ingress
    }

    pub fn lifecycle(&self) -> Option<LifecycleSettings> {
        self.lifecycle
    }

    pub fn lifecycle_override(&self) -> Option<LifecycleSettings> {
        self.lifecycle_override
    }

    pub fn attr(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(|v| v.as_str())
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(|v| v.as_integer())
    }

    pub fn duration(&self, key: &str) -> Option<Duration> {
        self.attr(key).and_then(|v| v.as_duration())
    }

    pub fn protocol(&self, key: &str) -> Option<Protocol> {
        self.attr(key).and_then(|v| v.as_protocol())
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(|v| v.as_bool())
    }

    /// Port attribute; validated into range at construction.
    pub fn port(&self, key: &str) -> Option<u16> {
        self.integer(key).and_then(|p| u16::try_from(p).ok())
    }

    pub fn listener_kind(&self) -> Option<ListenerKind> {
        self.string("kind").and_then(ListenerKind::from_str)
    }

    /// Name the resource will carry once provisioned.
    pub fn physical_name(&self) -> &str {
        self.string("name")
            .or_else(|| self.string("family"))
            .unwrap_or(&self.id)
    }

    pub(crate) fn with_lifecycle(mut self, settings: LifecycleSettings) -> Self {
        self.lifecycle = Some(settings);
        self
    }
}

fn validate(declaration: &DescriptorDeclaration) -> ModelResult<()> {
    let id = declaration.id.as_str();
    let kind = declaration.kind;
    let attrs = &declaration.attributes;
    if id.trim().is_empty() {
        return Err(ModelError::invalid(kind.as_str(), "descriptor id cannot be empty"));
    }
    if !declaration.containers.is_empty() && kind != ResourceKind::ContainerTaskDefinition {
        return Err(ModelError::invalid(id, format!("{} descriptors carry no containers", kind)));
    }
    if !declaration.ingress.is_empty() && kind != ResourceKind::SecurityGroup {
        return Err(ModelError::invalid(id, format!("{} descriptors carry no ingress rules", kind)));
    }

    for key in kind.required_attributes() {
        if !attrs.contains_key(*key) {
            return Err(ModelError::invalid(
                id,
                format!("missing required attribute '{}' for {}", key, kind),
            ));
        }
    }

    for (key, value) in attrs {
        if key == "port" || key.ends_with("_port") {
            check_port(id, key, value)?;
        }
    }

    let rules = Rules { id, attrs };
    match kind {
        ResourceKind::NetworkFabric => {
            rules.optional_integer_at_least("max_azs", 1)?;
            rules.optional_integer_at_least("nat_gateways", 0)?;
        }
        ResourceKind::ComputeCluster | ResourceKind::ImageRepository | ResourceKind::PrivateLink => {
            rules.non_empty_string("name")?;
        }
        ResourceKind::DataTable => validate_table(&rules)?,
        ResourceKind::ContainerTaskDefinition => validate_task(&rules, &declaration.containers)?,
        ResourceKind::ContainerService => {
            rules.non_empty_string("name")?;
            rules.integer_at_least("desired_count", 0)?;
            rules.non_empty_string("task_definition")?;
            rules.optional_non_empty_string("security_group")?;
        }
        ResourceKind::LoadBalancer => {
            rules.non_empty_string("name")?;
            rules.listener_kind()?;
        }
        ResourceKind::Listener => {
            let listener = rules.listener_kind()?;
            let protocol = rules.protocol("protocol")?;
            if !listener.allowed_protocols().contains(&protocol) {
                return Err(ModelError::invalid(
                    id,
                    format!("{} is not a valid protocol for a {} listener", protocol, listener),
                ));
            }
        }
        ResourceKind::TargetGroup => validate_target_group(&rules)?,
        ResourceKind::SecurityGroup => {
            rules.non_empty_string("name")?;
            validate_ingress(id, &declaration.ingress)?;
        }
        ResourceKind::LogGroup => {
            rules.non_empty_string("name")?;
        }
        ResourceKind::RestApi => {
            rules.non_empty_string("name")?;
            if let Some(level) = attrs.get("logging_level") {
                let level = level.as_str().unwrap_or_default();
                if !matches!(level, "OFF" | "ERROR" | "INFO") {
                    return Err(ModelError::invalid(
                        id,
                        format!("unknown logging level '{}'", level),
                    ));
                }
            }
        }
        ResourceKind::ApiRoute => {
            let method = rules.non_empty_string("method")?;
            if !HTTP_METHODS.contains(&method.to_uppercase().as_str()) {
                return Err(ModelError::invalid(id, format!("unknown HTTP method '{}'", method)));
            }
            let path = rules.non_empty_string("path")?;
            if !path.starts_with('/') {
                return Err(ModelError::invalid(id, format!("path '{}' must start with '/'", path)));
            }
        }
    }

    Ok(())
}

fn check_port(id: &str, key: &str, value: &AttributeValue) -> ModelResult<()> {
    match value.as_integer() {
        Some(port) if (1..=65535).contains(&port) => Ok(()),
        Some(port) => Err(ModelError::invalid(
            id,
            format!("port '{}' must be within 1-65535, got {}", key, port),
        )),
        None => Err(ModelError::invalid(
            id,
            format!("port '{}' must be an integer, got {}", key, value.type_name()),
        )),
    }
}

fn validate_table(rules: &Rules<'_>) -> ModelResult<()> {
    rules.non_empty_string("name")?;
    rules.non_empty_string("partition_key")?;

    if let Some(key_type) = rules.attrs.get("partition_key_type") {
        let key_type = key_type.as_str().unwrap_or_default();
        if !matches!(key_type, "string" | "number" | "binary") {
            return Err(rules.error(format!("unknown partition key type '{}'", key_type)));
        }
    }

    let billing = rules
        .attrs
        .get("billing_mode")
        .and_then(|v| v.as_str())
        .unwrap_or("on_demand");
    match billing {
        "provisioned" => {
            rules.integer_at_least("read_capacity", 1)?;
            rules.integer_at_least("write_capacity", 1)?;
        }
        "on_demand" => {
            for key in ["read_capacity", "write_capacity"] {
                if rules.attrs.contains_key(key) {
                    return Err(rules.error(format!("'{}' is only valid with provisioned billing", key)));
                }
            }
        }
        other => return Err(rules.error(format!("unknown billing mode '{}'", other))),
    }
    Ok(())
}

fn validate_task(rules: &Rules<'_>, containers: &[ContainerDefinition]) -> ModelResult<()> {
    rules.non_empty_string("family")?;

    let cpu = rules.integer("cpu")?;
    if !TASK_CPU_UNITS.contains(&cpu) {
        return Err(rules.error(format!(
            "cpu must be one of {:?}, got {}",
            TASK_CPU_UNITS, cpu
        )));
    }
    let memory = rules.integer_at_least("memory_mib", 1)?;
    validate_containers(rules.id, cpu, memory, containers)
}

fn validate_target_group(rules: &Rules<'_>) -> ModelResult<()> {
    let name = rules.non_empty_string("name")?;
    if name.len() > MAX_TARGET_GROUP_NAME {
        return Err(rules.error(format!(
            "target group name '{}' exceeds {} characters",
            name, MAX_TARGET_GROUP_NAME
        )));
    }

    let protocol = rules.protocol("protocol")?;
    if rules.attrs["deregistration_delay"].as_duration().is_none() {
        return Err(rules.error("deregistration_delay must be a duration"));
    }

    match rules.attrs.get("health_check_path") {
        Some(path) => {
            let path = path.as_str().unwrap_or_default();
            if !path.starts_with('/') {
                return Err(rules.error(format!("health check path '{}' must start with '/'", path)));
            }
        }
        None if protocol.is_layer7() => {
            return Err(rules.error(format!(
                "{} target groups need a health_check_path",
                protocol
            )));
        }
        None => {}
    }

    rules.optional_non_empty_string("listener")?;
    if rules.optional_non_empty_string("service")?.is_some() && !rules.attrs.contains_key("listener") {
        return Err(rules.error("a target group registering a service must name its listener"));
    }
    Ok(())
}

/// Attribute accessors that fail with the descriptor's id attached.
struct Rules<'a> {
    id: &'a str,
    attrs: &'a BTreeMap<String, AttributeValue>,
}

impl<'a> Rules<'a> {
    fn error(&self, reason: impl Into<String>) -> ModelError {
        ModelError::invalid(self.id, reason)
    }

    fn non_empty_string(&self, key: &str) -> ModelResult<&'a str> {
        match self.attrs.get(key).and_then(|v| v.as_str()) {
            Some(s) if !s.trim().is_empty() => Ok(s),
            Some(_) => Err(self.error(format!("'{}' cannot be empty", key))),
            None => Err(self.error(format!("'{}' must be a string", key))),
        }
    }

    fn optional_non_empty_string(&self, key: &str) -> ModelResult<Option<&'a str>> {
        if self.attrs.contains_key(key) {
            self.non_empty_string(key).map(Some)
        } else {
            Ok(None)
        }
    }

    fn integer(&self, key: &str) -> ModelResult<i64> {
        self.attrs
            .get(key)
            .and_then(|v| v.as_integer())
            .ok_or_else(|| self.error(format!("'{}' must be an integer", key)))
    }

    fn integer_at_least(&self, key: &str, min: i64) -> ModelResult<i64> {
        let value = self.integer(key)?;
        if value < min {
            return Err(self.error(format!("'{}' must be at least {}, got {}", key, min, value)));
        }
        Ok(value)
    }

    fn optional_integer_at_least(&self, key: &str, min: i64) -> ModelResult<Option<i64>> {
        if self.attrs.contains_key(key) {
            self.integer_at_least(key, min).map(Some)
        } else {
            Ok(None)
        }
    }

    fn protocol(&self, key: &str) -> ModelResult<Protocol> {
        self.attrs
            .get(key)
            .and_then(|v| v.as_protocol())
            .ok_or_else(|| self.error(format!("'{}' must be a protocol", key)))
    }

    fn listener_kind(&self) -> ModelResult<ListenerKind> {
        let kind = self.non_empty_string("kind")?;
        ListenerKind::from_str(kind)
            .ok_or_else(|| self.error(format!("unknown balancer kind '{}'", kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::PortMapping;

    fn listener(kind: &str, protocol: Protocol, port: i64) -> DescriptorDeclaration {
        DescriptorDeclaration::new("Listener", ResourceKind::Listener)
            .attr("kind", kind)
            .attr("protocol", protocol)
            .attr("port", port)
    }

    #[test]
    fn test_valid_network_listener() {
        let descriptor = listener("network", Protocol::Tcp, 8080).build().unwrap();
        assert_eq!(descriptor.port("port"), Some(8080));
        assert_eq!(descriptor.listener_kind(), Some(ListenerKind::Network));
    }

    #[test]
    fn test_udp_on_http_listener_rejected() {
        let err = listener("application", Protocol::Udp, 8080).build().unwrap_err();
        assert!(matches!(err, ModelError::ConfigurationValidation { ref descriptor, .. } if descriptor == "Listener"));
        assert!(err.to_string().contains("UDP"));
    }

    #[test]
    fn test_port_out_of_range() {
        assert!(listener("network", Protocol::Tcp, 0).build().is_err());
        assert!(listener("network", Protocol::Tcp, 65536).build().is_err());
        assert!(listener("network", Protocol::Tcp, 65535).build().is_ok());
    }

    #[test]
    fn test_missing_required_attribute() {
        let err = DescriptorDeclaration::new("Cluster", ResourceKind::ComputeCluster)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_provisioned_table_requires_capacity() {
        let table = DescriptorDeclaration::new("ProductsDdb", ResourceKind::DataTable)
            .attr("name", "products")
            .attr("partition_key", "id")
            .attr("billing_mode", "provisioned");
        assert!(table.clone().build().is_err());

        let table = table.attr("read_capacity", 1i64).attr("write_capacity", 1i64);
        assert!(table.build().is_ok());
    }

    #[test]
    fn test_on_demand_table_rejects_capacity() {
        let table = DescriptorDeclaration::new("Orders", ResourceKind::DataTable)
            .attr("name", "orders")
            .attr("partition_key", "id")
            .attr("read_capacity", 5i64);
        assert!(table.build().is_err());
    }

    fn task() -> DescriptorDeclaration {
        DescriptorDeclaration::new("TaskDefinition", ResourceKind::ContainerTaskDefinition)
            .attr("family", "products-service")
            .attr("cpu", 512i64)
            .attr("memory_mib", 1024i64)
            .container(
                ContainerDefinition::new("productsService")
                    .cpu(384)
                    .memory_mib(896)
                    .port(PortMapping::tcp(8080)),
            )
    }

    #[test]
    fn test_task_cpu_and_memory() {
        let descriptor = task().build().unwrap();
        assert!(descriptor.container("productsService").is_some());
        assert!(task().attr("cpu", 300i64).build().is_err());
        assert!(task().attr("memory_mib", 512i64).build().is_err());
    }

    #[test]
    fn test_task_with_sidecar() {
        let sidecar = ContainerDefinition::new("XRayProductsService")
            .cpu(128)
            .memory_mib(128)
            .port(PortMapping::udp(2000))
            .sidecar();
        let descriptor = task().container(sidecar.clone()).build().unwrap();
        assert_eq!(descriptor.containers().len(), 2);

        let crowded = task().attr("cpu", 512i64).container(sidecar.cpu(256));
        assert!(crowded.build().is_err());
    }

    #[test]
    fn test_task_without_containers_rejected() {
        let mut declaration = task();
        declaration.containers.clear();
        let err = declaration.build().unwrap_err();
        assert!(err.to_string().contains("at least one container"));
    }

    #[test]
    fn test_containers_only_on_tasks() {
        let cluster = DescriptorDeclaration::new("Cluster", ResourceKind::ComputeCluster)
            .attr("name", "ECommerceCluster")
            .container(ContainerDefinition::new("stray"));
        assert!(cluster.build().is_err());
    }

    #[test]
    fn test_security_group_ingress() {
        let group = DescriptorDeclaration::new("ServiceSecurityGroup", ResourceKind::SecurityGroup)
            .attr("name", "ProductsServiceSg")
            .ingress(IngressRule::tcp(8080));
        assert_eq!(group.clone().build().unwrap().ingress().len(), 1);

        let open_everything = group.ingress(IngressRule::tcp(22).from_source("0.0.0.0"));
        assert!(open_everything.build().is_err());
    }

    #[test]
    fn test_service_needs_task_definition() {
        let service = DescriptorDeclaration::new("Service", ResourceKind::ContainerService)
            .attr("name", "ProductsService")
            .attr("desired_count", 2i64);
        assert!(service.clone().build().is_err());
        assert!(service.attr("task_definition", "TaskDefinition").build().is_ok());
    }

    #[test]
    fn test_registering_target_group_names_listener() {
        let tg = DescriptorDeclaration::new("NlbTargetGroup", ResourceKind::TargetGroup)
            .attr("name", "productsServiceNlb")
            .attr("port", 8080i64)
            .attr("protocol", Protocol::Tcp)
            .attr("deregistration_delay", Duration::from_secs(30))
            .attr("service", "Service");
        assert!(tg.clone().build().is_err());
        assert!(tg.attr("listener", "NlbListener").build().is_ok());
    }

    #[test]
    fn test_http_target_group_needs_health_path() {
        let tg = DescriptorDeclaration::new("AlbTarget", ResourceKind::TargetGroup)
            .attr("name", "productsServiceAlb")
            .attr("port", 8080i64)
            .attr("protocol", Protocol::Http)
            .attr("deregistration_delay", Duration::from_secs(30));
        assert!(tg.clone().build().is_err());
        assert!(tg.attr("health_check_path", "/actuator/health").build().is_ok());
    }

    #[test]
    fn test_physical_name() {
        let descriptor = DescriptorDeclaration::new("Cluster", ResourceKind::ComputeCluster)
            .attr("name", "ECommerceCluster")
            .build()
            .unwrap();
        assert_eq!(descriptor.physical_name(), "ECommerceCluster");
    }
}
