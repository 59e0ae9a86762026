//! Error types for binding and graph resolution.

use thiserror::Error;

use weave_model::{CapabilityType, ModelError};

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while binding capabilities or ordering stacks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Stack '{stack}' is invalid: {source}")]
    InvalidStack { stack: String, source: ModelError },

    #[error("Missing capability: stack '{consumer}' slot '{slot}' requires a {capability} export and none matches")]
    MissingCapability {
        consumer: String,
        slot: String,
        capability: CapabilityType,
    },

    #[error("Ambiguous capability: stack '{consumer}' slot '{slot}' ({capability}) matches {}; name an explicit producer", .candidates.join(", "))]
    AmbiguousCapability {
        consumer: String,
        slot: String,
        capability: CapabilityType,
        candidates: Vec<String>,
    },

    #[error("Cyclic dependency between stacks: {}", cycle_path(.cycle))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Stack declared twice: {0}")]
    DuplicateStack(String),

    #[error("Stack '{stack}' exports '{export}' more than once")]
    DuplicateExport { stack: String, export: String },

    #[error("Stack not found: {0}")]
    UnknownStack(String),
}

/// `A -> B -> A` rendering of a cycle.
fn cycle_path(cycle: &[String]) -> String {
    let mut path = cycle.to_vec();
    if let Some(first) = cycle.first() {
        path.push(first.clone());
    }
    path.join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_closes_loop() {
        let err = GraphError::CyclicDependency {
            cycle: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic dependency between stacks: A -> B -> A");
    }
}
