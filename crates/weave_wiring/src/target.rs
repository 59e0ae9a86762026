//! Target registration and health checks for a service behind a target group.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use weave_model::{ComputeService, ListenerKind, Protocol};

use crate::chain::TargetGroupSpec;

pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(30);
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Health check attached to a target group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthCheck {
    /// Layer-7 check: GET on a path must succeed.
    Http {
        path: String,
        port: u16,
        interval_secs: u64,
        timeout_secs: u64,
    },
    /// Layer-4 check: a TCP connect must succeed.
    TcpConnect {
        port: u16,
        interval_secs: u64,
        timeout_secs: u64,
    },
}

impl HealthCheck {
    /// Health check matching the listener kind in front of the target group.
    pub fn for_target_group(listener: ListenerKind, target_group: &TargetGroupSpec, container_port: u16) -> Self {
        let port = target_group.health_check_port.unwrap_or(container_port);
        let interval_secs = HEALTH_CHECK_INTERVAL.as_secs();
        let timeout_secs = HEALTH_CHECK_TIMEOUT.as_secs();
        match listener {
            ListenerKind::Application => HealthCheck::Http {
                path: target_group
                    .health_check_path
                    .clone()
                    .unwrap_or_else(|| "/".to_string()),
                port,
                interval_secs,
                timeout_secs,
            },
            ListenerKind::Network => HealthCheck::TcpConnect {
                port,
                interval_secs,
                timeout_secs,
            },
        }
    }
}

/// One registered task replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    pub service: String,
    pub container: String,
    pub port: u16,
    pub replica: u32,
}

/// A target group with its registered replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRegistration {
    pub target_group: String,
    pub port: u16,
    pub protocol: Protocol,
    pub deregistration_delay_secs: u64,
    pub health_check: HealthCheck,
    pub targets: Vec<TargetEntry>,
}

impl TargetRegistration {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Register exactly `desired_count` replicas of `service` in the target group.
pub fn register_targets(
    listener: ListenerKind,
    target_group: &TargetGroupSpec,
    service: &ComputeService,
) -> TargetRegistration {
    if service.desired_count == 0 {
        warn!(
            "Service {} has no desired replicas; target group {} stays empty",
            service.service_name, target_group.name
        );
    }

    let targets: Vec<TargetEntry> = (0..service.desired_count)
        .map(|replica| TargetEntry {
            service: service.service_name.clone(),
            container: service.container_name.clone(),
            port: service.container_port,
            replica,
        })
        .collect();

    debug!(
        "Registered {} target(s) of {} in {}",
        targets.len(),
        service.service_name,
        target_group.name
    );

    TargetRegistration {
        target_group: target_group.name.clone(),
        port: target_group.port,
        protocol: target_group.protocol,
        deregistration_delay_secs: target_group.deregistration_delay.as_secs(),
        health_check: HealthCheck::for_target_group(listener, target_group, service.container_port),
        targets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alb_group() -> TargetGroupSpec {
        TargetGroupSpec {
            name: "productsServiceAlb".to_string(),
            port: 8080,
            protocol: Protocol::Http,
            deregistration_delay: Duration::from_secs(30),
            health_check_path: Some("/actuator/health".to_string()),
            health_check_port: Some(8080),
        }
    }

    fn service(desired_count: u32) -> ComputeService {
        ComputeService {
            service_name: "ProductsService".to_string(),
            container_name: "productsService".to_string(),
            container_port: 8080,
            protocol: Protocol::Tcp,
            desired_count,
        }
    }

    #[test]
    fn test_registers_one_entry_per_replica() {
        let registration = register_targets(ListenerKind::Application, &alb_group(), &service(2));
        assert_eq!(registration.targets.len(), 2);
        assert_eq!(registration.targets[1].replica, 1);
        assert_eq!(registration.deregistration_delay_secs, 30);
    }

    #[test]
    fn test_zero_replicas_gives_empty_group() {
        let registration = register_targets(ListenerKind::Application, &alb_group(), &service(0));
        assert!(registration.is_empty());
    }

    #[test]
    fn test_health_check_follows_listener_kind() {
        let http = HealthCheck::for_target_group(ListenerKind::Application, &alb_group(), 8080);
        assert_eq!(
            http,
            HealthCheck::Http {
                path: "/actuator/health".to_string(),
                port: 8080,
                interval_secs: 30,
                timeout_secs: 10,
            }
        );

        let mut tcp_group = alb_group();
        tcp_group.protocol = Protocol::Tcp;
        tcp_group.health_check_port = None;
        let tcp = HealthCheck::for_target_group(ListenerKind::Network, &tcp_group, 9090);
        assert!(matches!(tcp, HealthCheck::TcpConnect { port: 9090, .. }));
    }
}
