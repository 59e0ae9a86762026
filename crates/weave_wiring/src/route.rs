//! Public routes and the parameters they carry to the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{WiringError, WiringResult};
use crate::template::PathTemplate;

/// HTTP method accepted at the public entry layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Any,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Method plus path template matched at the entry layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPattern {
    pub method: HttpMethod,
    pub path: PathTemplate,
}

impl fmt::Display for EntryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Where a forwarded parameter lives in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterLocation {
    Path,
    Header,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
        }
    }
}

/// A parameter the entry layer must forward to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterBinding {
    pub location: ParameterLocation,
    pub name: String,
    pub required: bool,
}

impl ParameterBinding {
    /// Key on the incoming request, e.g. `method.request.path.id`.
    pub fn method_key(&self) -> String {
        format!("method.request.{}.{}", self.location.as_str(), self.name)
    }

    /// Key on the forwarded request, e.g. `integration.request.path.id`.
    pub fn integration_key(&self) -> String {
        format!("integration.request.{}.{}", self.location.as_str(), self.name)
    }
}

/// One wired route: a single method on a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRoute {
    entry: EntryPattern,
    backend_path: PathTemplate,
}

impl NetworkRoute {
    pub fn new(method: HttpMethod, path: &str, backend_path: &str) -> WiringResult<Self> {
        Ok(Self {
            entry: EntryPattern {
                method,
                path: PathTemplate::parse(path)?,
            },
            backend_path: PathTemplate::parse(backend_path)?,
        })
    }

    /// Route name as `METHOD /path`.
    pub fn name(&self) -> String {
        self.entry.to_string()
    }

    pub fn entry(&self) -> &EntryPattern {
        &self.entry
    }

    pub fn method(&self) -> HttpMethod {
        self.entry.method
    }

    pub fn path(&self) -> &PathTemplate {
        &self.entry.path
    }

    pub fn backend_path(&self) -> &PathTemplate {
        &self.backend_path
    }

    /// Path placeholders from the entry pattern plus the correlation header.
    pub fn parameter_bindings(&self, correlation_header: &str) -> Vec<ParameterBinding> {
        let mut bindings: Vec<ParameterBinding> = self
            .entry
            .path
            .placeholders()
            .into_iter()
            .map(|name| ParameterBinding {
                location: ParameterLocation::Path,
                name: name.to_string(),
                required: true,
            })
            .collect();
        bindings.push(ParameterBinding {
            location: ParameterLocation::Header,
            name: correlation_header.to_string(),
            required: false,
        });
        bindings
    }
}

/// A route as declared: one path served for one or more methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDeclaration {
    pub methods: Vec<HttpMethod>,
    pub path: String,
    pub backend_path: String,
}

impl RouteDeclaration {
    pub fn new(path: impl Into<String>, backend_path: impl Into<String>) -> Self {
        Self {
            methods: Vec::new(),
            path: path.into(),
            backend_path: backend_path.into(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// One [`NetworkRoute`] per declared method, in declaration order.
    pub fn expand(&self) -> WiringResult<Vec<NetworkRoute>> {
        if self.methods.is_empty() {
            return Err(WiringError::InvalidRoute {
                route: self.path.clone(),
                reason: "no methods declared".to_string(),
            });
        }
        let mut seen = Vec::new();
        let mut routes = Vec::with_capacity(self.methods.len());
        for method in &self.methods {
            if seen.contains(method) {
                return Err(WiringError::InvalidRoute {
                    route: format!("{} {}", method, self.path),
                    reason: "method declared twice".to_string(),
                });
            }
            seen.push(*method);
            routes.push(NetworkRoute::new(*method, &self.path, &self.backend_path)?);
        }
        Ok(routes)
    }
}
