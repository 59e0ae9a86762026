//! The synthesis pipeline.
//!
//! Stages run in a fixed sequence: export catalog, stack construction and
//! binding, dependency graph, synthesis order, route wiring, target
//! registration, plan assembly. Each stage either completes or aborts the
//! run; nothing is emitted unless every stage succeeded.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info, warn};

use weave_graph::{
    ExportCatalog, GraphError, Stack, StackDeclaration, StackGraph, StackGraphBuilder,
    SynthesisOrder, SynthesisOrderResolver,
};
use weave_model::{
    CapabilityExport, CapabilityValue, ComputeService, DescriptorDeclaration, ResourceDescriptor,
    ResourceKind, SynthConfig,
};
use weave_wiring::{
    CapabilityChain, NetworkRoute, NetworkWiringEngine, RouteTable, RouteWiring,
    TargetRegistration, WiringError,
};

use crate::declaration::{BackendBinding, PlanDeclaration};
use crate::emitter::PlanEmitter;
use crate::error::{SynthError, SynthResult};
use crate::plan::{ResolvedResource, ResolvedStack, SynthesizedPlan};

/// Routes wired in declaration order, grouped for the route table.
struct WiredRoutes {
    routes: Vec<RouteWiring>,
    table: RouteTable,
    /// `api_route` descriptors keyed by the stack serving them.
    descriptors: BTreeMap<String, Vec<ResourceDescriptor>>,
    /// Chains of the backends routes use, in first-use order.
    chains: Vec<CapabilityChain>,
}

/// Runs declarations through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    engine: NetworkWiringEngine,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(mut self, engine: NetworkWiringEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Construct every stack, bind its requirements and derive the checked graph.
    pub fn build_graph(&self, config: &SynthConfig, stacks: &[StackDeclaration]) -> SynthResult<StackGraph> {
        let catalog = ExportCatalog::from_declarations(stacks)?;
        debug!("Export catalog holds {} exports", catalog.len());

        let mut builder = StackGraphBuilder::new();
        for declaration in stacks {
            builder.add_stack(Stack::construct(declaration, &catalog, config)?)?;
        }
        Ok(builder.build_graph()?)
    }

    /// Everything up to and including the synthesis order.
    pub fn resolve_order(&self, declaration: &PlanDeclaration) -> SynthResult<(StackGraph, SynthesisOrder)> {
        let config = declaration.config()?;
        self.order_with(&config, declaration)
    }

    /// Run the full pipeline.
    pub fn synthesize(&self, declaration: &PlanDeclaration) -> SynthResult<SynthesizedPlan> {
        info!(
            "Synthesizing {} stacks and {} routes for {}/{}",
            declaration.stacks.len(),
            declaration.routes.len(),
            declaration.environment.account,
            declaration.environment.region
        );

        let config = declaration.config()?;
        let (graph, order) = self.order_with(&config, declaration)?;
        info!("Synthesis order: {}", order.stacks().join(" -> "));

        let mut wired = self.wire_routes(&graph, &config, declaration)?;
        let target_groups = self.register_targets(&graph, &order, &wired.chains)?;
        info!(
            "Wired {} routes; registered {} target groups",
            wired.routes.len(),
            target_groups.len()
        );

        let wave_of: HashMap<&str, usize> = order
            .waves()
            .iter()
            .enumerate()
            .flat_map(|(wave, names)| names.iter().map(move |name| (name.as_str(), wave)))
            .collect();

        let mut stacks = Vec::with_capacity(order.len());
        for name in order.stacks() {
            let stack = graph
                .stack(name)
                .ok_or_else(|| GraphError::UnknownStack(name.clone()))?;
            let wave = wave_of.get(name.as_str()).copied().unwrap_or_default();
            let mut resolved = ResolvedStack::from_stack(stack, wave);
            if let Some(routes) = wired.descriptors.remove(name) {
                resolved
                    .resources
                    .extend(routes.iter().map(|d| ResolvedResource::resolve(stack, d)));
            }
            stacks.push(resolved);
        }

        Ok(SynthesizedPlan {
            environment: declaration.environment.clone(),
            order: order.stacks().to_vec(),
            waves: order.waves().to_vec(),
            stacks,
            edges: graph.edges().to_vec(),
            routes: wired.routes,
            target_groups,
            route_table: wired.table,
        })
    }

    /// Run the full pipeline and hand the plan to `emitter` only on success.
    pub fn synthesize_and_emit(
        &self,
        declaration: &PlanDeclaration,
        emitter: &mut dyn PlanEmitter,
    ) -> SynthResult<SynthesizedPlan> {
        let plan = self.synthesize(declaration)?;
        emitter.emit(&plan)?;
        Ok(plan)
    }

    fn order_with(
        &self,
        config: &SynthConfig,
        declaration: &PlanDeclaration,
    ) -> SynthResult<(StackGraph, SynthesisOrder)> {
        let graph = self.build_graph(config, &declaration.stacks)?;
        let order = SynthesisOrderResolver::resolve(&graph)?;
        Ok((graph, order))
    }

    fn wire_routes(
        &self,
        graph: &StackGraph,
        config: &SynthConfig,
        declaration: &PlanDeclaration,
    ) -> SynthResult<WiredRoutes> {
        let mut chains: BTreeMap<&str, CapabilityChain> = BTreeMap::new();
        let mut first_use: Vec<&str> = Vec::new();
        let mut wired = WiredRoutes {
            routes: Vec::new(),
            table: RouteTable::new(),
            descriptors: BTreeMap::new(),
            chains: Vec::new(),
        };

        for binding in &declaration.routes {
            let name = binding.backend.as_str();
            let backend = declaration.backends.get(name).ok_or_else(|| SynthError::UnknownReference {
                owner: format!("route '{}'", binding.route.path),
                what: "backend",
                reference: name.to_string(),
            })?;
            let owner = owning_stack(graph, name, backend)?;

            if !chains.contains_key(name) {
                chains.insert(name, resolve_chain(graph, owner, name, backend)?);
                first_use.push(name);
            }
            let chain = &chains[name];

            let mut group = Vec::with_capacity(binding.route.methods.len());
            for route in binding.route.expand()? {
                let wiring = self.engine.wire(&route, chain)?;
                let descriptor = route_descriptor(config, owner, name, backend, &route)?;

                let served = wired.descriptors.entry(owner.name().to_string()).or_default();
                if owner.resource(descriptor.id()).is_some() || served.iter().any(|d| d.id() == descriptor.id()) {
                    return Err(SynthError::Declaration(format!(
                        "route '{}' declared twice",
                        descriptor.id()
                    )));
                }
                served.push(descriptor);
                group.push(wiring);
            }
            wired.table.add_group(&group);
            wired.routes.extend(group);
        }

        for name in declaration.backends.keys() {
            if !chains.contains_key(name.as_str()) {
                warn!("Backend '{}' is not used by any route", name);
            }
        }

        wired.chains = first_use
            .into_iter()
            .filter_map(|name| chains.remove(name))
            .collect();
        Ok(wired)
    }

    /// Register every service a target group names, in synthesis order, then
    /// the target groups routes reach that register no service of their own.
    fn register_targets(
        &self,
        graph: &StackGraph,
        order: &SynthesisOrder,
        chains: &[CapabilityChain],
    ) -> SynthResult<Vec<TargetRegistration>> {
        let mut registrations = Vec::new();
        let mut registered = HashSet::new();

        for name in order.stacks() {
            let stack = graph
                .stack(name)
                .ok_or_else(|| GraphError::UnknownStack(name.clone()))?;
            let groups = stack
                .resources()
                .iter()
                .filter(|r| r.kind() == ResourceKind::TargetGroup);
            for target_group in groups {
                let Some(service) = target_group.string("service") else {
                    continue;
                };
                let (listener, service) = service_target(stack, target_group, service)?;
                let registration = self.engine.register_service(listener, target_group, service)?;
                if !registered.insert(registration.target_group.clone()) {
                    return Err(SynthError::Declaration(format!(
                        "target group '{}' declared twice",
                        registration.target_group
                    )));
                }
                registrations.push(registration);
            }
        }

        for chain in chains {
            if registered.insert(chain.target_group.name.clone()) {
                registrations.push(self.engine.register_targets(chain));
            }
        }
        Ok(registrations)
    }
}

fn owning_stack<'g>(graph: &'g StackGraph, name: &str, backend: &BackendBinding) -> SynthResult<&'g Stack> {
    graph
        .stack(&backend.stack)
        .ok_or_else(|| SynthError::UnknownReference {
            owner: format!("backend '{}'", name),
            what: "stack",
            reference: backend.stack.clone(),
        })
}

fn bound_capability<'s>(owner: &'s Stack, backend: &str, slot: &str) -> SynthResult<&'s CapabilityExport> {
    owner
        .resolve_reference(slot)
        .ok_or_else(|| SynthError::UnknownReference {
            owner: format!("backend '{}'", backend),
            what: "capability",
            reference: format!("{}.{}", owner.name(), slot),
        })
}

/// Resolve a backend through its owning stack's bindings.
fn resolve_chain(
    graph: &StackGraph,
    owner: &Stack,
    name: &str,
    backend: &BackendBinding,
) -> SynthResult<CapabilityChain> {
    let link = backend
        .link
        .as_deref()
        .map(|slot| bound_capability(owner, name, slot))
        .transpose()?;
    let endpoint = bound_capability(owner, name, &backend.endpoint)?;
    let service = bound_capability(owner, name, &backend.service)?;

    let producer = graph
        .stack(&service.producer)
        .ok_or_else(|| GraphError::UnknownStack(service.producer.clone()))?;
    let target_group = producer
        .resource(&backend.target_group)
        .ok_or_else(|| SynthError::UnknownReference {
            owner: format!("backend '{}'", name),
            what: "resource",
            reference: format!("{}.{}", producer.name(), backend.target_group),
        })?;
    let invalid = |reason: String| WiringError::InvalidHop {
        hop: target_group.id().to_string(),
        reason,
    };
    let listener = target_group
        .string("listener")
        .and_then(|id| producer.resource(id))
        .ok_or_else(|| invalid("target group names no listener".to_string()))?;

    if let (Some(registered), CapabilityValue::ComputeService(routed)) = (
        target_group.string("service").and_then(|id| producer.resource(id)),
        &service.value,
    ) {
        if registered.physical_name() != routed.service_name {
            return Err(invalid(format!(
                "target group registers {} but backend '{}' routes to {}",
                registered.physical_name(),
                name,
                routed.service_name
            ))
            .into());
        }
    }

    let chain = CapabilityChain::from_exports(name, link, endpoint, listener, target_group, service)?;
    debug!(
        "Resolved backend '{}' of stack {} to target group {}",
        name,
        owner.name(),
        chain.target_group.name
    );
    Ok(chain)
}

/// The `api_route` descriptor a wired route adds to the stack serving it.
fn route_descriptor(
    config: &SynthConfig,
    owner: &Stack,
    name: &str,
    backend: &BackendBinding,
    route: &NetworkRoute,
) -> SynthResult<ResourceDescriptor> {
    let api = owner
        .resources()
        .iter()
        .find(|r| r.kind() == ResourceKind::RestApi)
        .ok_or_else(|| {
            SynthError::Declaration(format!(
                "stack '{}' serves backend '{}' but declares no rest_api",
                owner.name(),
                name
            ))
        })?;

    let mut declaration = DescriptorDeclaration::new(route.name(), ResourceKind::ApiRoute)
        .attr("api", api.id())
        .attr("method", route.method().as_str())
        .attr("path", route.path().to_string())
        .attr("backend_path", route.backend_path().to_string())
        .attr("backend", name);
    if let Some(link) = &backend.link {
        declaration = declaration.reference(link.as_str());
    }
    let declaration = declaration
        .reference(backend.endpoint.as_str())
        .reference(backend.service.as_str());
    Ok(config.lifecycle.apply(declaration.build()?))
}

/// Listener and compute service a target group registers.
fn service_target<'s>(
    stack: &'s Stack,
    target_group: &ResourceDescriptor,
    service: &str,
) -> SynthResult<(&'s ResourceDescriptor, &'s ComputeService)> {
    let listener = target_group
        .string("listener")
        .and_then(|id| stack.resource(id))
        .ok_or_else(|| WiringError::InvalidHop {
            hop: target_group.id().to_string(),
            reason: "target group names no listener".to_string(),
        })?;
    let service_name = stack
        .resource(service)
        .map(|d| d.physical_name())
        .unwrap_or(service);
    let exported = stack
        .exports()
        .iter()
        .find_map(|export| match &export.value {
            CapabilityValue::ComputeService(s) if s.service_name == service_name => Some(s),
            _ => None,
        })
        .ok_or_else(|| {
            SynthError::Declaration(format!(
                "stack '{}' registers {} in {} but exports no compute_service for it",
                stack.name(),
                service_name,
                target_group.id()
            ))
        })?;
    Ok((listener, exported))
}
