//! Containers inside a task definition.
//!
//! A task reserves cpu and memory once; its containers share that budget.
//! The main application container and any sidecars (tracing daemons, log
//! routers) are declared side by side, each with its own port mappings,
//! environment and log group.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attribute::Protocol;
use crate::error::{ModelError, ModelResult};

/// A port a container listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
}

impl PortMapping {
    pub fn tcp(container_port: u16) -> Self {
        Self {
            container_port,
            protocol: Protocol::Tcp,
        }
    }

    pub fn udp(container_port: u16) -> Self {
        Self {
            container_port,
            protocol: Protocol::Udp,
        }
    }
}

fn default_protocol() -> Protocol {
    Protocol::Tcp
}

fn default_essential() -> bool {
    true
}

/// One container of a task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    pub name: String,
    /// Registry image; containers without one run the task's repository image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub cpu: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mib: Option<u32>,
    /// A task stops when an essential container stops.
    #[serde(default = "default_essential")]
    pub essential: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Id of a log group descriptor in the same stack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group: Option<String>,
}

impl ContainerDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            cpu: 0,
            memory_mib: None,
            essential: true,
            port_mappings: Vec::new(),
            environment: BTreeMap::new(),
            log_group: None,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn cpu(mut self, cpu: u32) -> Self {
        self.cpu = cpu;
        self
    }

    pub fn memory_mib(mut self, memory_mib: u32) -> Self {
        self.memory_mib = Some(memory_mib);
        self
    }

    pub fn sidecar(mut self) -> Self {
        self.essential = false;
        self
    }

    pub fn port(mut self, mapping: PortMapping) -> Self {
        self.port_mappings.push(mapping);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn log_group(mut self, log_group: impl Into<String>) -> Self {
        self.log_group = Some(log_group.into());
        self
    }

    /// Whether the container maps `port` with `protocol`.
    pub fn exposes(&self, port: u16, protocol: Protocol) -> bool {
        self.port_mappings
            .iter()
            .any(|m| m.container_port == port && m.protocol == protocol)
    }
}

/// Check a task's containers against each other and against the task's cpu and memory.
pub(crate) fn validate_containers(
    task: &str,
    task_cpu: i64,
    task_memory: i64,
    containers: &[ContainerDefinition],
) -> ModelResult<()> {
    let invalid = |reason: String| ModelError::invalid(task, reason);

    if containers.is_empty() {
        return Err(invalid("a task definition needs at least one container".to_string()));
    }
    let env_key = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| invalid(e.to_string()))?;

    let mut names = HashSet::new();
    for container in containers {
        let name = container.name.trim();
        if name.is_empty() {
            return Err(invalid("container name cannot be empty".to_string()));
        }
        if !names.insert(name) {
            return Err(invalid(format!("container '{}' declared twice", name)));
        }
        if container.memory_mib == Some(0) {
            return Err(invalid(format!("container '{}' reserves no memory", name)));
        }
        for mapping in &container.port_mappings {
            if mapping.container_port == 0 {
                return Err(invalid(format!(
                    "container '{}' port must be within 1-65535, got 0",
                    name
                )));
            }
            if !matches!(mapping.protocol, Protocol::Tcp | Protocol::Udp) {
                return Err(invalid(format!(
                    "container port mappings speak TCP or UDP, not {}",
                    mapping.protocol
                )));
            }
        }
        if let Some(key) = container.environment.keys().find(|k| !env_key.is_match(k)) {
            return Err(invalid(format!(
                "container '{}' has invalid environment variable name '{}'",
                name, key
            )));
        }
    }

    let cpu: i64 = containers.iter().map(|c| i64::from(c.cpu)).sum();
    if cpu > task_cpu {
        return Err(invalid(format!(
            "containers reserve {} cpu units, task has {}",
            cpu, task_cpu
        )));
    }
    let memory: i64 = containers
        .iter()
        .filter_map(|c| c.memory_mib)
        .map(i64::from)
        .sum();
    if memory > task_memory {
        return Err(invalid(format!(
            "containers reserve {} MiB, task has {} MiB",
            memory, task_memory
        )));
    }

    if !containers.iter().any(|c| c.essential) {
        return Err(invalid("at least one container must be essential".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> ContainerDefinition {
        ContainerDefinition::new("productsService")
            .cpu(384)
            .memory_mib(896)
            .port(PortMapping::tcp(8080))
            .env("SERVER_PORT", "8080")
    }

    fn xray() -> ContainerDefinition {
        ContainerDefinition::new("XRayProductsService")
            .image("public.ecr.aws/xray/aws-xray-daemon:latest")
            .cpu(128)
            .memory_mib(128)
            .port(PortMapping::udp(2000))
            .sidecar()
    }

    #[test]
    fn test_main_container_with_sidecar() {
        assert!(validate_containers("TaskDefinition", 512, 1024, &[products(), xray()]).is_ok());
        assert!(products().exposes(8080, Protocol::Tcp));
        assert!(!xray().exposes(2000, Protocol::Tcp));
    }

    #[test]
    fn test_containers_share_task_budget() {
        let err = validate_containers("TaskDefinition", 256, 1024, &[products(), xray()]).unwrap_err();
        assert!(err.to_string().contains("512 cpu units"));

        let err = validate_containers("TaskDefinition", 512, 512, &[products(), xray()]).unwrap_err();
        assert!(err.to_string().contains("1024 MiB"));
    }

    #[test]
    fn test_task_needs_essential_container() {
        assert!(validate_containers("TaskDefinition", 512, 1024, &[xray()]).is_err());
        assert!(validate_containers("TaskDefinition", 512, 1024, &[]).is_err());
    }

    #[test]
    fn test_duplicate_container_name() {
        let err = validate_containers("TaskDefinition", 1024, 2048, &[products(), products()]).unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_invalid_environment_name() {
        let container = products().env("1BAD", "x");
        assert!(validate_containers("TaskDefinition", 512, 1024, &[container]).is_err());
    }

    #[test]
    fn test_http_port_mapping_rejected() {
        let mut container = products();
        container.port_mappings[0].protocol = Protocol::Http;
        assert!(validate_containers("TaskDefinition", 512, 1024, &[container]).is_err());
    }

    #[test]
    fn test_container_from_yaml() {
        let container: ContainerDefinition = serde_yaml::from_str(
            "name: XRayProductsService\ncpu: 128\nessential: false\nport_mappings:\n  - { container_port: 2000, protocol: UDP }",
        )
        .unwrap();
        assert!(!container.essential);
        assert!(container.exposes(2000, Protocol::Udp));

        let container: ContainerDefinition =
            serde_yaml::from_str("name: app\nport_mappings: [{ container_port: 8080 }]").unwrap();
        assert!(container.essential);
        assert!(container.exposes(8080, Protocol::Tcp));
    }
}
