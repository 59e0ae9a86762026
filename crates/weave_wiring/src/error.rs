//! Error types for network wiring.

use thiserror::Error;

use weave_model::{CapabilityType, Protocol};

/// Result type alias for wiring operations.
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors that can occur while wiring a route to its backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WiringError {
    #[error("Unbound placeholder '{{{placeholder}}}' on route '{route}' at hop '{hop}'")]
    UnboundPlaceholder {
        route: String,
        hop: String,
        placeholder: String,
    },

    #[error("Protocol mismatch on route '{route}' at hop '{hop}': {upstream} cannot feed {downstream}")]
    ProtocolMismatch {
        route: String,
        hop: String,
        upstream: Protocol,
        downstream: Protocol,
    },

    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("Invalid hop '{hop}': {reason}")]
    InvalidHop { hop: String, reason: String },

    #[error("Route '{route}' needs a {expected} capability as its {role}, got {found}")]
    MissingCapability {
        route: String,
        role: String,
        expected: CapabilityType,
        found: String,
    },
}
