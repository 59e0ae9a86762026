//! Stacks: named groups of resource descriptors with declared capability
//! requirements and exports.
//!
//! A [`StackDeclaration`] is what a user writes. [`Stack::construct`] turns it
//! into an immutable [`Stack`], binding every requirement eagerly so the
//! stack's view of its producers is fixed before anything reads it.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use weave_model::{
    CapabilityExport, CapabilityRequirement, CapabilityType, CapabilityValue, ComputeService,
    DescriptorDeclaration, ExportDeclaration, ModelError, ResourceDescriptor, ResourceKind,
    SynthConfig,
};

use crate::binder::{CapabilityBinder, ExportCatalog};
use crate::error::{GraphError, GraphResult};

/// A stack as declared, before binding and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDeclaration {
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub requires: Vec<CapabilityRequirement>,
    #[serde(default)]
    pub exports: Vec<ExportDeclaration>,
    #[serde(default)]
    pub resources: Vec<DescriptorDeclaration>,
}

impl StackDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeMap::new(),
            requires: Vec::new(),
            exports: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn requires(mut self, requirement: CapabilityRequirement) -> Self {
        self.requires.push(requirement);
        self
    }

    pub fn export(mut self, export: ExportDeclaration) -> Self {
        self.exports.push(export);
        self
    }

    pub fn resource(mut self, resource: DescriptorDeclaration) -> Self {
        self.resources.push(resource);
        self
    }
}

/// Reject empty stack names and names with surrounding whitespace.
pub(crate) fn check_stack_name(name: &str) -> GraphResult<()> {
    let reason = if name.trim().is_empty() {
        "stack name cannot be empty"
    } else if name.trim() != name {
        "stack name has leading or trailing whitespace"
    } else {
        return Ok(());
    };
    Err(GraphError::InvalidStack {
        stack: name.to_string(),
        source: ModelError::invalid("stack", reason),
    })
}

/// A requirement slot and the export it was bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub requirement: CapabilityRequirement,
    pub export: CapabilityExport,
}

impl Binding {
    pub fn slot(&self) -> &str {
        &self.requirement.slot
    }

    pub fn producer(&self) -> &str {
        &self.export.producer
    }
}

/// A constructed, immutable stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    name: String,
    tags: BTreeMap<String, String>,
    resources: Vec<ResourceDescriptor>,
    bindings: Vec<Binding>,
    exports: Vec<CapabilityExport>,
}

impl Stack {
    /// Validate a declaration, bind its requirements against `catalog` and
    /// apply the lifecycle policy from `config` to every descriptor.
    pub fn construct(
        declaration: &StackDeclaration,
        catalog: &ExportCatalog,
        config: &SynthConfig,
    ) -> GraphResult<Self> {
        check_stack_name(&declaration.name)?;
        let name = declaration.name.as_str();
        let invalid = |source: ModelError| GraphError::InvalidStack {
            stack: name.to_string(),
            source,
        };

        let mut slots = HashSet::new();
        let mut bindings = Vec::with_capacity(declaration.requires.len());
        for requirement in &declaration.requires {
            if !slots.insert(requirement.slot.as_str()) {
                return Err(invalid(ModelError::invalid(
                    &requirement.slot,
                    "requirement slot declared twice",
                )));
            }
            let export = CapabilityBinder::bind(name, requirement, catalog.exports())?;
            bindings.push(Binding {
                requirement: requirement.clone(),
                export,
            });
        }

        let exports: Vec<CapabilityExport> = catalog.exports_of(name).cloned().collect();

        let mut stack = Self {
            name: name.to_string(),
            tags: config.merged_tags(&declaration.tags),
            resources: Vec::with_capacity(declaration.resources.len()),
            bindings,
            exports,
        };

        let mut ids = HashSet::new();
        for resource in &declaration.resources {
            let descriptor = resource.clone().build().map_err(invalid)?;
            if !ids.insert(descriptor.id().to_string()) {
                return Err(invalid(ModelError::invalid(
                    descriptor.id(),
                    "descriptor id declared twice in the stack",
                )));
            }
            stack.check_references(&descriptor).map_err(invalid)?;
            stack.resources.push(config.lifecycle.apply(descriptor));
        }
        stack.check_local_links().map_err(invalid)?;
        stack.check_service_exports().map_err(invalid)?;

        if stack.resources.is_empty() {
            warn!("Stack '{}' declares no resources", stack.name);
        }
        debug!(
            "Constructed stack '{}' ({} resources, {} bindings, {} exports)",
            stack.name,
            stack.resources.len(),
            stack.bindings.len(),
            stack.exports.len()
        );
        Ok(stack)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn exports(&self) -> &[CapabilityExport] {
        &self.exports
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.id() == id)
    }

    pub fn export(&self, name: &str) -> Option<&CapabilityExport> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// The export a descriptor reference resolves to: a bound requirement
    /// slot, or one of this stack's own exports.
    pub fn resolve_reference(&self, name: &str) -> Option<&CapabilityExport> {
        self.bindings
            .iter()
            .find(|b| b.slot() == name)
            .map(|b| &b.export)
            .or_else(|| self.export(name))
    }

    /// Stacks this one consumes from, in binding order without repeats.
    pub fn producers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.bindings
            .iter()
            .map(|b| b.producer())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    fn check_references(&self, descriptor: &ResourceDescriptor) -> Result<(), ModelError> {
        let mut referenced: Vec<CapabilityType> = Vec::new();
        for reference in descriptor.references() {
            let export = self.resolve_reference(&reference.name).ok_or_else(|| {
                ModelError::invalid(
                    descriptor.id(),
                    format!(
                        "reference '{}' names neither a requirement slot nor an export of the stack",
                        reference.name
                    ),
                )
            })?;
            referenced.push(export.capability_type());
        }

        for needed in descriptor.kind().required_capabilities() {
            if !referenced.contains(needed) {
                return Err(ModelError::invalid(
                    descriptor.id(),
                    format!(
                        "{} descriptors must reference a {} capability",
                        descriptor.kind(),
                        needed
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Attributes that name another descriptor must name one of this stack, of the right kind.
    fn check_local_links(&self) -> Result<(), ModelError> {
        for resource in &self.resources {
            let links: &[(&str, ResourceKind)] = match resource.kind() {
                ResourceKind::RestApi => &[("access_log_group", ResourceKind::LogGroup)],
                ResourceKind::ContainerService => &[
                    ("task_definition", ResourceKind::ContainerTaskDefinition),
                    ("security_group", ResourceKind::SecurityGroup),
                ],
                ResourceKind::TargetGroup => &[
                    ("listener", ResourceKind::Listener),
                    ("service", ResourceKind::ContainerService),
                ],
                _ => &[],
            };
            for (key, kind) in links {
                if let Some(id) = resource.string(key) {
                    self.expect_local(resource, key, id, *kind)?;
                }
            }
            for container in resource.containers() {
                if let Some(group) = &container.log_group {
                    self.expect_local(resource, "log_group", group, ResourceKind::LogGroup)?;
                }
            }
        }
        Ok(())
    }

    fn expect_local(
        &self,
        owner: &ResourceDescriptor,
        key: &str,
        id: &str,
        kind: ResourceKind,
    ) -> Result<(), ModelError> {
        match self.resource(id) {
            Some(found) if found.kind() == kind => Ok(()),
            _ => Err(ModelError::invalid(
                owner.id(),
                format!("{} '{}' is not a {} descriptor of this stack", key, id, kind),
            )),
        }
    }

    /// A compute service export must describe the stack's own service and task.
    ///
    /// Stacks without `container_service` descriptors export services they do
    /// not run here; those exports are taken as declared.
    fn check_service_exports(&self) -> Result<(), ModelError> {
        let services: Vec<&ResourceDescriptor> = self
            .resources
            .iter()
            .filter(|r| r.kind() == ResourceKind::ContainerService)
            .collect();
        if services.is_empty() {
            return Ok(());
        }

        for export in &self.exports {
            if let CapabilityValue::ComputeService(service) = &export.value {
                self.check_service_export(export, service, &services)?;
            }
        }
        Ok(())
    }

    fn check_service_export(
        &self,
        export: &CapabilityExport,
        service: &ComputeService,
        services: &[&ResourceDescriptor],
    ) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::invalid(export.qualified_name(), reason);

        let descriptor = services
            .iter()
            .find(|d| d.physical_name() == service.service_name)
            .ok_or_else(|| {
                invalid(format!(
                    "service '{}' matches no container_service descriptor of the stack",
                    service.service_name
                ))
            })?;

        let desired = descriptor.integer("desired_count").unwrap_or_default();
        if desired != i64::from(service.desired_count) {
            return Err(invalid(format!(
                "export declares {} replicas but {} runs {}",
                service.desired_count,
                descriptor.id(),
                desired
            )));
        }

        let task = descriptor
            .string("task_definition")
            .and_then(|id| self.resource(id))
            .ok_or_else(|| invalid(format!("{} names no task definition", descriptor.id())))?;
        let container = task.container(&service.container_name).ok_or_else(|| {
            invalid(format!(
                "task {} has no container '{}'",
                task.id(),
                service.container_name
            ))
        })?;
        if !container.exposes(service.container_port, service.protocol) {
            return Err(invalid(format!(
                "container '{}' does not map {}/{}",
                container.name, service.container_port, service.protocol
            )));
        }
        Ok(())
    }
}
