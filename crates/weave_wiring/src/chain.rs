//! The capability chain a route travels: link, endpoint, listener, target group, service.

use std::time::Duration;

use serde::Serialize;

use weave_model::{
    CapabilityExport, CapabilityType, CapabilityValue, ComputeService, ListenerKind,
    NetworkEndpoint, NetworkLink, Protocol, ResourceDescriptor, ResourceKind,
};

use crate::error::{WiringError, WiringResult};

/// Listener settings read from a `listener` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerSpec {
    pub name: String,
    pub kind: ListenerKind,
    pub port: u16,
    pub protocol: Protocol,
}

impl ListenerSpec {
    pub fn from_descriptor(descriptor: &ResourceDescriptor) -> WiringResult<Self> {
        expect_kind(descriptor, ResourceKind::Listener)?;
        let missing = |key: &str| invalid_hop(descriptor, format!("missing or invalid '{}'", key));
        Ok(Self {
            name: descriptor.id().to_string(),
            kind: descriptor.listener_kind().ok_or_else(|| missing("kind"))?,
            port: descriptor.port("port").ok_or_else(|| missing("port"))?,
            protocol: descriptor.protocol("protocol").ok_or_else(|| missing("protocol"))?,
        })
    }
}

/// Target group settings read from a `target_group` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroupSpec {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,
    pub deregistration_delay: Duration,
    pub health_check_path: Option<String>,
    pub health_check_port: Option<u16>,
}

impl TargetGroupSpec {
    pub fn from_descriptor(descriptor: &ResourceDescriptor) -> WiringResult<Self> {
        expect_kind(descriptor, ResourceKind::TargetGroup)?;
        let missing = |key: &str| invalid_hop(descriptor, format!("missing or invalid '{}'", key));
        Ok(Self {
            name: descriptor.physical_name().to_string(),
            port: descriptor.port("port").ok_or_else(|| missing("port"))?,
            protocol: descriptor.protocol("protocol").ok_or_else(|| missing("protocol"))?,
            deregistration_delay: descriptor
                .duration("deregistration_delay")
                .ok_or_else(|| missing("deregistration_delay"))?,
            health_check_path: descriptor.string("health_check_path").map(str::to_string),
            health_check_port: descriptor.port("health_check_port"),
        })
    }
}

fn expect_kind(descriptor: &ResourceDescriptor, kind: ResourceKind) -> WiringResult<()> {
    if descriptor.kind() != kind {
        return Err(invalid_hop(
            descriptor,
            format!("expected a {} descriptor, got {}", kind.as_str(), descriptor.kind().as_str()),
        ));
    }
    Ok(())
}

fn invalid_hop(descriptor: &ResourceDescriptor, reason: String) -> WiringError {
    WiringError::InvalidHop {
        hop: descriptor.id().to_string(),
        reason,
    }
}

/// Everything a route needs between the entry layer and the container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityChain {
    pub link: Option<NetworkLink>,
    pub endpoint: NetworkEndpoint,
    pub listener: ListenerSpec,
    pub target_group: TargetGroupSpec,
    pub service: ComputeService,
}

impl CapabilityChain {
    pub fn new(
        endpoint: NetworkEndpoint,
        listener: ListenerSpec,
        target_group: TargetGroupSpec,
        service: ComputeService,
    ) -> Self {
        Self {
            link: None,
            endpoint,
            listener,
            target_group,
            service,
        }
    }

    pub fn with_link(mut self, link: NetworkLink) -> Self {
        self.link = Some(link);
        self
    }

    /// Assemble a chain from bound exports and the descriptors of the listener and target group.
    ///
    /// Each export must carry the capability type of its role, otherwise
    /// [`WiringError::MissingCapability`] names the role and what was found.
    pub fn from_exports(
        route: &str,
        link: Option<&CapabilityExport>,
        endpoint: &CapabilityExport,
        listener: &ResourceDescriptor,
        target_group: &ResourceDescriptor,
        service: &CapabilityExport,
    ) -> WiringResult<Self> {
        let endpoint = match &endpoint.value {
            CapabilityValue::NetworkEndpoint(e) => e.clone(),
            _ => return Err(missing(route, "endpoint", CapabilityType::NetworkEndpoint, endpoint)),
        };
        let service = match &service.value {
            CapabilityValue::ComputeService(s) => s.clone(),
            _ => return Err(missing(route, "service", CapabilityType::ComputeService, service)),
        };
        let link = match link {
            Some(export) => match &export.value {
                CapabilityValue::NetworkLink(l) => Some(l.clone()),
                _ => return Err(missing(route, "link", CapabilityType::NetworkLink, export)),
            },
            None => None,
        };

        let mut chain = Self::new(
            endpoint,
            ListenerSpec::from_descriptor(listener)?,
            TargetGroupSpec::from_descriptor(target_group)?,
            service,
        );
        if let Some(link) = link {
            chain = chain.with_link(link);
        }
        Ok(chain)
    }
}

fn missing(route: &str, role: &str, expected: CapabilityType, found: &CapabilityExport) -> WiringError {
    WiringError::MissingCapability {
        route: route.to_string(),
        role: role.to_string(),
        expected,
        found: format!("{} ({})", found.qualified_name(), found.capability_type()),
    }
}
