//! # weave_core
//!
//! The synthesis pipeline. A [`PlanDeclaration`] goes in; a
//! [`SynthesizedPlan`] with the stack order, provisioning waves, resolved
//! stacks, wired routes and target registrations comes out.
//!
//! Synthesis is a pure function of the declaration: the same input always
//! produces a byte-identical plan, and a failure at any stage means no plan
//! is handed to the [`PlanEmitter`].
//!
//! ## Example
//!
//! ```rust
//! use weave_core::{PlanDeclaration, Synthesizer};
//!
//! let declaration = PlanDeclaration::from_yaml_str(r#"
//! environment:
//!   account: "199840700690"
//!   region: eu-north-1
//! stacks:
//!   - name: Cluster
//!     requires:
//!       - slot: vpc
//!         capability: network_fabric
//!   - name: Vpc
//!     exports:
//!       - name: vpc
//!         value:
//!           type: network_fabric
//!           id: vpc-0e1
//! "#).unwrap();
//!
//! let plan = Synthesizer::new().synthesize(&declaration).unwrap();
//! assert_eq!(plan.order, vec!["Vpc", "Cluster"]);
//! ```

pub mod declaration;
pub mod emitter;
pub mod error;
pub mod plan;
pub mod synthesizer;

pub use declaration::{BackendBinding, PlanDeclaration, RouteBinding};
pub use emitter::{JsonFileEmitter, JsonWriterEmitter, PlanEmitter};
pub use error::{SynthError, SynthResult};
pub use plan::{ResolvedCapability, ResolvedResource, ResolvedStack, SlotBinding, SynthesizedPlan};
pub use synthesizer::Synthesizer;
