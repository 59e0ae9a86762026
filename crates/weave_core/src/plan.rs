//! The synthesized plan handed to the provisioning engine.

use std::collections::BTreeMap;

use serde::Serialize;

use weave_graph::{DependencyEdge, Stack};
use weave_model::{
    AttributeValue, CapabilityValue, ContainerDefinition, Environment, IngressRule,
    LifecycleSettings, ResourceDescriptor, ResourceKind,
};
use weave_wiring::{RouteTable, RouteWiring, TargetRegistration};

use crate::error::SynthResult;

/// A capability reference replaced by the value it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCapability {
    /// `Producer.export` the reference resolved through.
    pub export: String,
    pub value: CapabilityValue,
}

/// A descriptor with every reference resolved and lifecycle applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedResource {
    pub id: String,
    pub kind: ResourceKind,
    pub physical_name: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub containers: Vec<ContainerDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ingress: Vec<IngressRule>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub references: BTreeMap<String, ResolvedCapability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleSettings>,
}

impl ResolvedResource {
    /// Resolve `descriptor`'s references through `stack`'s bindings and exports.
    pub fn resolve(stack: &Stack, descriptor: &ResourceDescriptor) -> Self {
        Self {
            id: descriptor.id().to_string(),
            kind: descriptor.kind(),
            physical_name: descriptor.physical_name().to_string(),
            attributes: descriptor.attributes().clone(),
            containers: descriptor.containers().to_vec(),
            ingress: descriptor.ingress().to_vec(),
            references: descriptor
                .references()
                .iter()
                .filter_map(|reference| {
                    stack.resolve_reference(&reference.name).map(|export| {
                        (
                            reference.name.clone(),
                            ResolvedCapability {
                                export: export.qualified_name(),
                                value: export.value.clone(),
                            },
                        )
                    })
                })
                .collect(),
            lifecycle: descriptor.lifecycle(),
        }
    }
}

/// Which producer export filled one requirement slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotBinding {
    pub slot: String,
    pub producer: String,
    pub export: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStack {
    pub name: String,
    pub wave: usize,
    pub tags: BTreeMap<String, String>,
    pub consumes: Vec<SlotBinding>,
    pub exports: Vec<String>,
    pub resources: Vec<ResolvedResource>,
}

impl ResolvedStack {
    pub fn from_stack(stack: &Stack, wave: usize) -> Self {
        let resources = stack
            .resources()
            .iter()
            .map(|descriptor| ResolvedResource::resolve(stack, descriptor))
            .collect();

        Self {
            name: stack.name().to_string(),
            wave,
            tags: stack.tags().clone(),
            consumes: stack
                .bindings()
                .iter()
                .map(|binding| SlotBinding {
                    slot: binding.slot().to_string(),
                    producer: binding.producer().to_string(),
                    export: binding.export.name.clone(),
                })
                .collect(),
            exports: stack.exports().iter().map(|e| e.name.clone()).collect(),
            resources,
        }
    }

    pub fn resource(&self, id: &str) -> Option<&ResolvedResource> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// Complete, deterministic output of one synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedPlan {
    pub environment: Environment,
    pub order: Vec<String>,
    pub waves: Vec<Vec<String>>,
    /// Stacks in synthesis order.
    pub stacks: Vec<ResolvedStack>,
    pub edges: Vec<DependencyEdge>,
    pub routes: Vec<RouteWiring>,
    pub target_groups: Vec<TargetRegistration>,
    #[serde(skip)]
    pub route_table: RouteTable,
}

impl SynthesizedPlan {
    pub fn stack(&self, name: &str) -> Option<&ResolvedStack> {
        self.stacks.iter().find(|s| s.name == name)
    }

    pub fn route(&self, name: &str) -> Option<&RouteWiring> {
        self.routes.iter().find(|r| r.route == name)
    }

    /// Pretty-printed JSON. Identical input gives byte-identical output.
    pub fn to_json(&self) -> SynthResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
