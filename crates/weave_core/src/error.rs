//! Error types for the synthesis pipeline.

use std::path::PathBuf;

use thiserror::Error;

use weave_graph::GraphError;
use weave_model::ModelError;
use weave_wiring::WiringError;

/// Result type alias for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur while loading declarations or synthesizing a plan.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Wiring(#[from] WiringError),

    #[error("Invalid declaration: {0}")]
    Declaration(String),

    #[error("{owner} references unknown {what} '{reference}'")]
    UnknownReference {
        owner: String,
        what: &'static str,
        reference: String,
    },

    #[error("Unsupported declaration format: {0} (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to emit plan: {0}")]
    Emit(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
