//! Path templates with `{name}` placeholders.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{WiringError, WiringResult};

/// One `/`-separated piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed path such as `/products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> WiringResult<Self> {
        let invalid = |reason: String| WiringError::InvalidRoute {
            route: raw.to_string(),
            reason,
        };

        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("path must start with '/'".to_string()))?;

        let placeholder = Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)\}$")
            .map_err(|e| invalid(format!("placeholder pattern: {}", e)))?;

        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty path segment".to_string()));
                }
                if let Some(caps) = placeholder.captures(part) {
                    let name = caps[1].to_string();
                    if !seen.insert(name.clone()) {
                        return Err(invalid(format!("placeholder '{{{}}}' appears twice", name)));
                    }
                    segments.push(Segment::Placeholder(name));
                } else if part.contains('{') || part.contains('}') {
                    return Err(invalid(format!("malformed placeholder segment '{}'", part)));
                } else {
                    segments.push(Segment::Literal(part.to_string()));
                }
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in path order.
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().contains(&name)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Serialize for PathTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
