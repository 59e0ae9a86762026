//! Capabilities: typed, read-only handles one stack exposes for others.
//!
//! A producer declares [`CapabilityExport`]s; a consumer declares
//! [`CapabilityRequirement`] slots. Binding a slot to an export is what
//! creates a dependency edge between two stacks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute::{ListenerKind, Protocol};

/// The type tag of a capability, used for matching requirements to exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityType {
    NetworkFabric,
    ComputeCluster,
    NetworkEndpoint,
    ImageRepository,
    NetworkLink,
    ComputeService,
    DataTable,
    SecurityGroup,
}

impl CapabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityType::NetworkFabric => "network_fabric",
            CapabilityType::ComputeCluster => "compute_cluster",
            CapabilityType::NetworkEndpoint => "network_endpoint",
            CapabilityType::ImageRepository => "image_repository",
            CapabilityType::NetworkLink => "network_link",
            CapabilityType::ComputeService => "compute_service",
            CapabilityType::DataTable => "data_table",
            CapabilityType::SecurityGroup => "security_group",
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A network fabric (VPC) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkFabric {
    pub id: String,
}

/// A compute cluster identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeCluster {
    pub id: String,
}

/// A load-balancer endpoint reachable by DNS name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEndpoint {
    pub dns_name: String,
    pub port: u16,
    pub balancer: ListenerKind,
}

/// A container image repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRepository {
    pub uri: String,
}

/// A private link connecting a public entry layer to a restricted network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub id: String,
}

/// Running task replicas behind one logical service name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeService {
    pub service_name: String,
    pub container_name: String,
    pub container_port: u16,
    #[serde(default = "default_container_protocol")]
    pub protocol: Protocol,
    pub desired_count: u32,
}

fn default_container_protocol() -> Protocol {
    Protocol::Tcp
}

/// A data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
}

/// A security group other stacks may open ports from or attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
}

/// The payload of an exported capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapabilityValue {
    NetworkFabric(NetworkFabric),
    ComputeCluster(ComputeCluster),
    NetworkEndpoint(NetworkEndpoint),
    ImageRepository(ImageRepository),
    NetworkLink(NetworkLink),
    ComputeService(ComputeService),
    DataTable(DataTable),
    SecurityGroup(SecurityGroup),
}

impl CapabilityValue {
    pub fn capability_type(&self) -> CapabilityType {
        match self {
            CapabilityValue::NetworkFabric(_) => CapabilityType::NetworkFabric,
            CapabilityValue::ComputeCluster(_) => CapabilityType::ComputeCluster,
            CapabilityValue::NetworkEndpoint(_) => CapabilityType::NetworkEndpoint,
            CapabilityValue::ImageRepository(_) => CapabilityType::ImageRepository,
            CapabilityValue::NetworkLink(_) => CapabilityType::NetworkLink,
            CapabilityValue::ComputeService(_) => CapabilityType::ComputeService,
            CapabilityValue::DataTable(_) => CapabilityType::DataTable,
            CapabilityValue::SecurityGroup(_) => CapabilityType::SecurityGroup,
        }
    }
}

/// An export as declared by its owning stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDeclaration {
    /// Export name, unique within the owning stack.
    pub name: String,
    pub value: CapabilityValue,
}

impl ExportDeclaration {
    pub fn new(name: impl Into<String>, value: CapabilityValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A capability exported by a named producer stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityExport {
    pub producer: String,
    pub name: String,
    pub value: CapabilityValue,
}

impl CapabilityExport {
    pub fn new(producer: impl Into<String>, declaration: ExportDeclaration) -> Self {
        Self {
            producer: producer.into(),
            name: declaration.name,
            value: declaration.value,
        }
    }

    pub fn capability_type(&self) -> CapabilityType {
        self.value.capability_type()
    }

    /// `Producer.export` form used in messages and plan output.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.producer, self.name)
    }
}

/// A typed slot a stack needs filled by exactly one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequirement {
    /// Slot name, referenced by the stack's descriptors.
    pub slot: String,
    pub capability: CapabilityType,
    /// Explicit producer stack, used to disambiguate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    /// Explicit export name within the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<String>,
}

impl CapabilityRequirement {
    pub fn new(slot: impl Into<String>, capability: CapabilityType) -> Self {
        Self {
            slot: slot.into(),
            capability,
            producer: None,
            export: None,
        }
    }

    pub fn from_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn from_export(mut self, producer: impl Into<String>, export: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self.export = Some(export.into());
        self
    }

    /// Whether `export` is an admissible candidate for this slot.
    pub fn accepts(&self, export: &CapabilityExport) -> bool {
        export.capability_type() == self.capability
            && self.producer.as_ref().map_or(true, |p| *p == export.producer)
            && self.export.as_ref().map_or(true, |e| *e == export.name)
    }
}

/// A descriptor's pointer at a capability it needs at construction time:
/// either one of its stack's requirement slots or one of the stack's own exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityReference {
    pub name: String,
}

impl CapabilityReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(producer: &str, name: &str) -> CapabilityExport {
        CapabilityExport::new(
            producer,
            ExportDeclaration::new(
                name,
                CapabilityValue::NetworkEndpoint(NetworkEndpoint {
                    dns_name: format!("{}.elb.local", name),
                    port: 8080,
                    balancer: ListenerKind::Network,
                }),
            ),
        )
    }

    #[test]
    fn test_requirement_accepts_by_type() {
        let requirement = CapabilityRequirement::new("nlb", CapabilityType::NetworkEndpoint);
        assert!(requirement.accepts(&endpoint("Nlb", "nlb")));

        let wrong = CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric);
        assert!(!wrong.accepts(&endpoint("Nlb", "nlb")));
    }

    #[test]
    fn test_requirement_explicit_export() {
        let requirement = CapabilityRequirement::new("alb", CapabilityType::NetworkEndpoint)
            .from_export("Nlb", "alb");
        assert!(requirement.accepts(&endpoint("Nlb", "alb")));
        assert!(!requirement.accepts(&endpoint("Nlb", "nlb")));
        assert!(!requirement.accepts(&endpoint("Other", "alb")));
    }

    #[test]
    fn test_capability_value_yaml_tagging() {
        let value: CapabilityValue =
            serde_yaml::from_str("type: image_repository\nuri: 123.dkr.ecr/products").unwrap();
        assert_eq!(value.capability_type(), CapabilityType::ImageRepository);

        let value: CapabilityValue =
            serde_yaml::from_str("type: security_group\nid: sg-0products").unwrap();
        assert_eq!(value.capability_type(), CapabilityType::SecurityGroup);
    }
}
