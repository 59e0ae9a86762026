//! # weave_graph
//!
//! Turns stack declarations into an ordered, acyclic build plan.
//!
//! # Pipeline
//!
//! 1. [`ExportCatalog`] collects every declared export
//! 2. [`Stack::construct`] validates descriptors and binds each requirement
//!    through [`CapabilityBinder`]
//! 3. [`StackGraphBuilder`] derives producer → consumer edges and rejects cycles
//! 4. [`SynthesisOrderResolver`] sorts the graph with stable tie-breaking
//!
//! # Example
//!
//! ```rust
//! use weave_graph::{ExportCatalog, Stack, StackDeclaration, StackGraphBuilder, SynthesisOrderResolver};
//! use weave_model::{
//!     CapabilityRequirement, CapabilityType, CapabilityValue, Environment, ExportDeclaration,
//!     NetworkFabric, SynthConfig,
//! };
//!
//! let declarations = vec![
//!     StackDeclaration::new("Cluster")
//!         .requires(CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric)),
//!     StackDeclaration::new("Vpc").export(ExportDeclaration::new(
//!         "vpc",
//!         CapabilityValue::NetworkFabric(NetworkFabric { id: "vpc-1".into() }),
//!     )),
//! ];
//!
//! let config = SynthConfig::new(Environment::new("123456789012", "eu-north-1"));
//! let catalog = ExportCatalog::from_declarations(&declarations).unwrap();
//! let mut builder = StackGraphBuilder::new();
//! for declaration in &declarations {
//!     builder.add_stack(Stack::construct(declaration, &catalog, &config).unwrap()).unwrap();
//! }
//!
//! let order = SynthesisOrderResolver::resolve(&builder.build_graph().unwrap()).unwrap();
//! assert_eq!(order.stacks(), &["Vpc", "Cluster"]);
//! ```

pub mod binder;
pub mod error;
pub mod graph;
pub mod order;
pub mod stack;

pub use binder::{CapabilityBinder, ExportCatalog};
pub use error::{GraphError, GraphResult};
pub use graph::{DependencyEdge, StackGraph, StackGraphBuilder};
pub use order::{SynthesisOrder, SynthesisOrderResolver};
pub use stack::{Binding, Stack, StackDeclaration};
