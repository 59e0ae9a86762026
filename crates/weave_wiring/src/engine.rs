//! Route wiring from the public entry layer to a backend container port.
//!
//! [`NetworkWiringEngine::wire`] lays out the hop chain for one route,
//! checks that every hop can accept what the previous one emits, and checks
//! that path placeholders are carried to every hop that targets a URI.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use weave_model::{ComputeService, ListenerKind, Protocol, ResourceDescriptor};

use crate::chain::{CapabilityChain, ListenerSpec, TargetGroupSpec};
use crate::error::{WiringError, WiringResult};
use crate::route::{HttpMethod, NetworkRoute, ParameterLocation};
use crate::target::{register_targets, TargetRegistration};
use crate::template::PathTemplate;

/// Header injected at the entry hop for request correlation.
pub const CORRELATION_HEADER: &str = "requestId";

/// Entry-layer context value that fills the correlation header.
pub const CORRELATION_SOURCE: &str = "context.requestId";

/// How the entry layer forwards requests upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamProtocol {
    /// HTTP proxy passthrough preserving method and body.
    HttpProxy,
    /// Layer-4 passthrough to a network listener.
    TcpPassthrough,
}

impl UpstreamProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamProtocol::HttpProxy => "HTTP proxy",
            UpstreamProtocol::TcpPassthrough => "TCP passthrough",
        }
    }
}

impl fmt::Display for UpstreamProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Network path the entry layer uses to reach the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    PrivateLink,
    Internet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopLayer {
    Entry,
    PrivateLink,
    Listener,
    TargetGroup,
    ContainerPort,
}

/// One hop of a wired route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WiredHop {
    pub layer: HopLayer,
    pub name: String,
    pub accepts: Protocol,
    pub emits: Protocol,
    /// URI or path this hop forwards to, if it rewrites the request target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path_parameters: Vec<String>,
}

/// The fully wired form of a [`NetworkRoute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteWiring {
    pub route: String,
    pub method: HttpMethod,
    pub path: String,
    pub upstream: UpstreamProtocol,
    pub connection: ConnectionType,
    pub integration_uri: String,
    /// Parameters declared at the entry hop; `true` marks required.
    pub method_parameters: BTreeMap<String, bool>,
    /// Parameters forwarded to the backend, keyed by destination.
    pub integration_parameters: BTreeMap<String, String>,
    pub path_parameters: Vec<String>,
    pub injected_headers: Vec<String>,
    pub target_group: String,
    pub hops: Vec<WiredHop>,
}

/// Hop under construction, still holding its parsed target template.
struct HopDraft<'a> {
    hop: WiredHop,
    template: Option<&'a PathTemplate>,
}

/// Wires routes through a [`CapabilityChain`].
#[derive(Debug, Clone)]
pub struct NetworkWiringEngine {
    correlation_header: String,
}

impl Default for NetworkWiringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkWiringEngine {
    pub fn new() -> Self {
        Self {
            correlation_header: CORRELATION_HEADER.to_string(),
        }
    }

    pub fn with_correlation_header(mut self, header: impl Into<String>) -> Self {
        self.correlation_header = header.into();
        self
    }

    pub fn correlation_header(&self) -> &str {
        &self.correlation_header
    }

    /// Wire a single route. Pure: the same inputs always give the same wiring.
    pub fn wire(&self, route: &NetworkRoute, chain: &CapabilityChain) -> WiringResult<RouteWiring> {
        let name = route.name();
        check_balancer(&name, chain)?;

        let integration_uri = format!(
            "{}://{}:{}{}",
            scheme(chain.listener.protocol),
            chain.endpoint.dns_name,
            chain.listener.port,
            route.backend_path()
        );
        let hops = self.lay_out_hops(route, chain, &integration_uri);

        check_placeholders(&name, route.path(), &hops)?;
        check_protocols(&name, &hops)?;

        let upstream = match (&chain.link, chain.listener.kind) {
            (Some(_), _) | (None, ListenerKind::Application) => UpstreamProtocol::HttpProxy,
            (None, ListenerKind::Network) => UpstreamProtocol::TcpPassthrough,
        };
        let connection = if chain.link.is_some() {
            ConnectionType::PrivateLink
        } else {
            ConnectionType::Internet
        };

        let mut method_parameters = BTreeMap::new();
        let mut integration_parameters = BTreeMap::new();
        for binding in route.parameter_bindings(&self.correlation_header) {
            method_parameters.insert(binding.method_key(), binding.required);
            let source = match binding.location {
                ParameterLocation::Header => CORRELATION_SOURCE.to_string(),
                ParameterLocation::Path => binding.method_key(),
            };
            integration_parameters.insert(binding.integration_key(), source);
        }

        debug!(
            "Wired {} via {} ({} hops, {} integration parameters)",
            name,
            upstream,
            hops.len(),
            integration_parameters.len()
        );

        Ok(RouteWiring {
            route: name,
            method: route.method(),
            path: route.path().to_string(),
            upstream,
            connection,
            integration_uri,
            method_parameters,
            integration_parameters,
            path_parameters: route.path().placeholders().iter().map(|p| p.to_string()).collect(),
            injected_headers: vec![self.correlation_header.clone()],
            target_group: chain.target_group.name.clone(),
            hops: hops.into_iter().map(|d| d.hop).collect(),
        })
    }

    /// Register the chain's service replicas in its target group.
    pub fn register_targets(&self, chain: &CapabilityChain) -> TargetRegistration {
        register_targets(chain.listener.kind, &chain.target_group, &chain.service)
    }

    /// Register `service` in a target group attached to `listener`, whether or
    /// not any route travels through them.
    pub fn register_service(
        &self,
        listener: &ResourceDescriptor,
        target_group: &ResourceDescriptor,
        service: &ComputeService,
    ) -> WiringResult<TargetRegistration> {
        let listener = ListenerSpec::from_descriptor(listener)?;
        let target_group = TargetGroupSpec::from_descriptor(target_group)?;
        if !listener.protocol.feeds(target_group.protocol) {
            return Err(WiringError::InvalidHop {
                hop: target_group.name,
                reason: format!(
                    "{} listener {} cannot forward to a {} target group",
                    listener.protocol, listener.name, target_group.protocol
                ),
            });
        }
        Ok(register_targets(listener.kind, &target_group, service))
    }

    fn lay_out_hops<'a>(
        &self,
        route: &'a NetworkRoute,
        chain: &CapabilityChain,
        integration_uri: &str,
    ) -> Vec<HopDraft<'a>> {
        let backend = route.backend_path();
        let mut drafts = vec![draft(HopLayer::Entry, route.name(), Protocol::Http, None, None)];

        // The integration target sits on the first hop past the entry layer.
        let mut uri = Some(integration_uri.to_string());
        if let Some(link) = &chain.link {
            drafts.push(draft(HopLayer::PrivateLink, link.id.clone(), Protocol::Http, uri.take(), Some(backend)));
        }

        let listener = &chain.listener;
        let listener_template = uri.as_ref().map(|_| backend);
        drafts.push(draft(
            HopLayer::Listener,
            format!("{}:{}", listener.name, listener.port),
            listener.protocol,
            uri.take(),
            listener_template,
        ));

        // Application listeners forward by path, so the target group rewrites to the backend path.
        let (tg_target, tg_template) = match listener.kind {
            ListenerKind::Application => (Some(backend.to_string()), Some(backend)),
            ListenerKind::Network => (None, None),
        };
        drafts.push(draft(
            HopLayer::TargetGroup,
            chain.target_group.name.clone(),
            chain.target_group.protocol,
            tg_target,
            tg_template,
        ));

        drafts.push(draft(
            HopLayer::ContainerPort,
            format!("{}:{}", chain.service.container_name, chain.service.container_port),
            chain.service.protocol,
            None,
            None,
        ));
        drafts
    }
}

fn draft<'a>(
    layer: HopLayer,
    name: String,
    protocol: Protocol,
    target: Option<String>,
    template: Option<&'a PathTemplate>,
) -> HopDraft<'a> {
    HopDraft {
        hop: WiredHop {
            layer,
            name,
            accepts: protocol,
            emits: protocol,
            target,
            path_parameters: template
                .map(|t| t.placeholders().iter().map(|p| p.to_string()).collect())
                .unwrap_or_default(),
        },
        template,
    }
}

fn scheme(listener_protocol: Protocol) -> &'static str {
    match listener_protocol {
        Protocol::Https | Protocol::Tls => "https",
        _ => "http",
    }
}

fn check_balancer(route: &str, chain: &CapabilityChain) -> WiringResult<()> {
    let listener = &chain.listener;
    if listener.kind != chain.endpoint.balancer {
        return Err(WiringError::InvalidHop {
            hop: listener.name.clone(),
            reason: format!(
                "{} listener attached to a {} balancer on route '{}'",
                listener.kind, chain.endpoint.balancer, route
            ),
        });
    }
    if listener.port != chain.endpoint.port {
        return Err(WiringError::InvalidHop {
            hop: listener.name.clone(),
            reason: format!(
                "listener port {} differs from endpoint {} port {} on route '{}'",
                listener.port, chain.endpoint.dns_name, chain.endpoint.port, route
            ),
        });
    }
    Ok(())
}

/// Entry placeholders and each downstream target's placeholders must be the same set.
fn check_placeholders(route: &str, entry: &PathTemplate, hops: &[HopDraft<'_>]) -> WiringResult<()> {
    let declared: BTreeSet<&str> = entry.placeholders().into_iter().collect();

    for draft in hops.iter().skip(1) {
        let Some(template) = draft.template else {
            continue;
        };
        let targeted: BTreeSet<&str> = template.placeholders().into_iter().collect();
        let unbound = declared
            .difference(&targeted)
            .chain(targeted.difference(&declared))
            .next();
        if let Some(placeholder) = unbound {
            return Err(WiringError::UnboundPlaceholder {
                route: route.to_string(),
                hop: draft.hop.name.clone(),
                placeholder: placeholder.to_string(),
            });
        }
    }
    Ok(())
}

fn check_protocols(route: &str, hops: &[HopDraft<'_>]) -> WiringResult<()> {
    for pair in hops.windows(2) {
        let (upstream, downstream) = (&pair[0].hop, &pair[1].hop);
        if !upstream.emits.feeds(downstream.accepts) {
            return Err(WiringError::ProtocolMismatch {
                route: route.to_string(),
                hop: downstream.name.clone(),
                upstream: upstream.emits,
                downstream: downstream.accepts,
            });
        }
    }
    Ok(())
}
