//! Declaration files: environment, stacks, backends and routes.
//!
//! A declaration is plain data. YAML (`.yaml`, `.yml`) and TOML (`.toml`)
//! are accepted; the format is picked from the file extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use weave_graph::StackDeclaration;
use weave_model::{Environment, LifecyclePolicy, LifecycleSettings, ResourceKind, SynthConfig};
use weave_wiring::RouteDeclaration;

use crate::error::{SynthError, SynthResult};

/// The chain of capabilities one or more routes travel through.
///
/// A backend belongs to the stack that serves its routes. Link, endpoint and
/// service name capabilities of that stack (bound requirement slots or its
/// own exports), so the owning stack is ordered after every producer the
/// routes reach. The target group is a descriptor of the stack producing the
/// service; its `listener` attribute names the listener in front of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendBinding {
    pub stack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub endpoint: String,
    pub service: String,
    pub target_group: String,
}

impl BackendBinding {
    pub fn new(
        stack: impl Into<String>,
        endpoint: impl Into<String>,
        service: impl Into<String>,
        target_group: impl Into<String>,
    ) -> Self {
        Self {
            stack: stack.into(),
            link: None,
            endpoint: endpoint.into(),
            service: service.into(),
            target_group: target_group.into(),
        }
    }

    pub fn through_link(mut self, slot: impl Into<String>) -> Self {
        self.link = Some(slot.into());
        self
    }
}

/// A route declaration bound to a named backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBinding {
    #[serde(flatten)]
    pub route: RouteDeclaration,
    pub backend: String,
}

/// Everything one synthesis run consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDeclaration {
    pub environment: Environment,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Lifecycle overrides keyed by resource kind (`log_group`, `data_table`, ...).
    #[serde(default)]
    pub lifecycle: BTreeMap<String, LifecycleSettings>,
    #[serde(default)]
    pub stacks: Vec<StackDeclaration>,
    #[serde(default)]
    pub backends: BTreeMap<String, BackendBinding>,
    #[serde(default)]
    pub routes: Vec<RouteBinding>,
}

impl PlanDeclaration {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            tags: BTreeMap::new(),
            lifecycle: BTreeMap::new(),
            stacks: Vec::new(),
            backends: BTreeMap::new(),
            routes: Vec::new(),
        }
    }

    /// Load a declaration from disk, choosing the parser by extension.
    pub fn from_file(path: &Path) -> SynthResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let parse: fn(&str) -> SynthResult<Self> = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str,
            Some("toml") => Self::from_toml_str,
            _ => return Err(SynthError::UnsupportedFormat(path.to_path_buf())),
        };

        let content = fs::read_to_string(path)?;
        let declaration = parse(&content)?;
        debug!(
            "Loaded declaration {} ({} stacks, {} routes)",
            path.display(),
            declaration.stacks.len(),
            declaration.routes.len()
        );
        Ok(declaration)
    }

    pub fn from_yaml_str(yaml: &str) -> SynthResult<Self> {
        serde_yaml::from_str(yaml).map_err(SynthError::from)
    }

    pub fn from_toml_str(toml: &str) -> SynthResult<Self> {
        toml::from_str(toml).map_err(SynthError::from)
    }

    /// Build and validate the synthesis configuration this declaration describes.
    pub fn config(&self) -> SynthResult<SynthConfig> {
        let mut overrides = BTreeMap::new();
        for (key, settings) in &self.lifecycle {
            let kind = ResourceKind::all()
                .into_iter()
                .find(|k| k.as_str() == key)
                .ok_or_else(|| {
                    SynthError::Declaration(format!("unknown resource kind '{}' in lifecycle", key))
                })?;
            overrides.insert(kind, *settings);
        }

        let config = SynthConfig::new(self.environment.clone())
            .with_tags(self.tags.clone())
            .with_lifecycle(LifecyclePolicy::standard().with_rules(overrides));
        config.validate()?;
        Ok(config)
    }

    pub fn stack(mut self, stack: StackDeclaration) -> Self {
        self.stacks.push(stack);
        self
    }

    pub fn backend(mut self, name: impl Into<String>, backend: BackendBinding) -> Self {
        self.backends.insert(name.into(), backend);
        self
    }

    pub fn route(mut self, route: RouteDeclaration, backend: impl Into<String>) -> Self {
        self.routes.push(RouteBinding {
            route,
            backend: backend.into(),
        });
        self
    }
}
