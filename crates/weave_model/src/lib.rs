//! # weave_model
//!
//! Typed description of provisionable resources and the capabilities stacks
//! exchange.
//!
//! ## Contents
//!
//! - [`ResourceDescriptor`]: a validated, immutable attribute bag for one
//!   resource kind
//! - [`CapabilityExport`] / [`CapabilityRequirement`]: typed handles and slots
//!   that replace live cross-stack object references
//! - [`LifecyclePolicy`]: per-kind teardown and retention table
//! - [`SynthConfig`]: environment, tags and lifecycle passed into construction
//!
//! ## Example
//!
//! ```rust
//! use weave_model::{DescriptorDeclaration, LifecyclePolicy, Protocol, ResourceKind};
//!
//! let listener = DescriptorDeclaration::new("NlbListener", ResourceKind::Listener)
//!     .attr("kind", "network")
//!     .attr("protocol", Protocol::Tcp)
//!     .attr("port", 8080i64)
//!     .build()
//!     .unwrap();
//!
//! let listener = LifecyclePolicy::standard().apply(listener);
//! assert!(listener.lifecycle().is_some());
//! ```

pub mod attribute;
pub mod capability;
pub mod config;
pub mod container;
pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod security;

pub use attribute::{AttributeValue, ListenerKind, Protocol};
pub use capability::{
    CapabilityExport, CapabilityReference, CapabilityRequirement, CapabilityType, CapabilityValue,
    ComputeCluster, ComputeService, DataTable, ExportDeclaration, ImageRepository, NetworkEndpoint,
    NetworkFabric, NetworkLink, SecurityGroup,
};
pub use config::{Environment, SynthConfig};
pub use container::{ContainerDefinition, PortMapping};
pub use descriptor::{DescriptorDeclaration, ResourceDescriptor, ResourceKind};
pub use error::{ModelError, ModelResult};
pub use lifecycle::{LifecyclePolicy, LifecycleSettings, Teardown};
pub use security::{IngressRule, ANY_IPV4};
