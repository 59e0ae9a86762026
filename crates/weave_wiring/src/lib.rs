//! # weave_wiring
//!
//! Wiring of public API routes through private links, balancers and target
//! groups down to container ports.
//!
//! A [`RouteDeclaration`] expands into one [`NetworkRoute`] per method. The
//! [`NetworkWiringEngine`] walks each route through a [`CapabilityChain`],
//! checking protocol compatibility hop by hop and carrying path placeholders
//! and the correlation header to the backend.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use weave_model::{ComputeService, ListenerKind, NetworkEndpoint, NetworkLink, Protocol};
//! use weave_wiring::{
//!     CapabilityChain, HttpMethod, ListenerSpec, NetworkWiringEngine, RouteDeclaration,
//!     TargetGroupSpec, UpstreamProtocol,
//! };
//!
//! let chain = CapabilityChain::new(
//!     NetworkEndpoint { dns_name: "nlb.internal".into(), port: 8080, balancer: ListenerKind::Network },
//!     ListenerSpec { name: "NlbListener".into(), kind: ListenerKind::Network, port: 8080, protocol: Protocol::Tcp },
//!     TargetGroupSpec {
//!         name: "productsServiceNlb".into(),
//!         port: 8080,
//!         protocol: Protocol::Tcp,
//!         deregistration_delay: Duration::from_secs(30),
//!         health_check_path: None,
//!         health_check_port: None,
//!     },
//!     ComputeService {
//!         service_name: "ProductsService".into(),
//!         container_name: "productsService".into(),
//!         container_port: 8080,
//!         protocol: Protocol::Tcp,
//!         desired_count: 2,
//!     },
//! )
//! .with_link(NetworkLink { id: "vpcLink".into() });
//!
//! let routes = RouteDeclaration::new("/products/{id}", "/api/products/{id}")
//!     .method(HttpMethod::Get)
//!     .expand()
//!     .unwrap();
//! let wiring = NetworkWiringEngine::new().wire(&routes[0], &chain).unwrap();
//! assert_eq!(wiring.upstream, UpstreamProtocol::HttpProxy);
//! assert_eq!(wiring.integration_parameters.len(), 2);
//! ```

pub mod chain;
pub mod engine;
pub mod error;
pub mod route;
pub mod table;
pub mod target;
pub mod template;

pub use chain::{CapabilityChain, ListenerSpec, TargetGroupSpec};
pub use engine::{
    ConnectionType, HopLayer, NetworkWiringEngine, RouteWiring, UpstreamProtocol, WiredHop,
    CORRELATION_HEADER, CORRELATION_SOURCE,
};
pub use error::{WiringError, WiringResult};
pub use route::{EntryPattern, HttpMethod, NetworkRoute, ParameterBinding, ParameterLocation, RouteDeclaration};
pub use table::{RouteTable, RouteTableRow};
pub use target::{register_targets, HealthCheck, TargetEntry, TargetRegistration};
pub use template::{PathTemplate, Segment};
