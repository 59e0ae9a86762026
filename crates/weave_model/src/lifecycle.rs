//! Resource lifecycle policy.
//!
//! A single table keyed by resource kind decides what happens to a resource
//! when its stack is torn down and how long its data is retained. Every
//! descriptor of a kind gets the same settings unless it carries its own
//! override.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::{ResourceDescriptor, ResourceKind};
use crate::error::{ModelError, ModelResult};

/// Retention windows (in days) accepted by the log backend.
pub const RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// Teardown behavior when the owning stack is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Teardown {
    #[default]
    Destroy,
    Retain,
}

/// Lifecycle settings applied to a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LifecycleSettings {
    #[serde(default)]
    pub teardown: Teardown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
}

impl LifecycleSettings {
    pub fn destroy() -> Self {
        Self {
            teardown: Teardown::Destroy,
            retention_days: None,
        }
    }

    pub fn retain() -> Self {
        Self {
            teardown: Teardown::Retain,
            retention_days: None,
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = Some(days);
        self
    }

    pub fn validate(&self, descriptor: &str) -> ModelResult<()> {
        if let Some(days) = self.retention_days {
            if !RETENTION_DAYS.contains(&days) {
                return Err(ModelError::invalid(
                    descriptor,
                    format!("retention of {} days is not a supported retention window", days),
                ));
            }
        }
        Ok(())
    }
}

/// Process-wide lifecycle table, passed explicitly into stack construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecyclePolicy {
    #[serde(default)]
    rules: BTreeMap<ResourceKind, LifecycleSettings>,
    #[serde(default)]
    fallback: LifecycleSettings,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl LifecyclePolicy {
    /// An empty table: everything destroys, nothing is retained.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            fallback: LifecycleSettings::destroy(),
        }
    }

    /// Defaults for a disposable environment: logs kept for a month,
    /// tables destroyed with the stack, image repositories retained.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(
                ResourceKind::LogGroup,
                LifecycleSettings::destroy().with_retention_days(30),
            )
            .with_rule(ResourceKind::DataTable, LifecycleSettings::destroy())
            .with_rule(ResourceKind::ImageRepository, LifecycleSettings::retain())
    }

    pub fn with_rule(mut self, kind: ResourceKind, settings: LifecycleSettings) -> Self {
        self.rules.insert(kind, settings);
        self
    }

    /// Merge per-kind overrides on top of this table.
    pub fn with_rules(mut self, rules: BTreeMap<ResourceKind, LifecycleSettings>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn settings_for(&self, kind: ResourceKind) -> LifecycleSettings {
        self.rules.get(&kind).copied().unwrap_or(self.fallback)
    }

    pub fn validate(&self) -> ModelResult<()> {
        for (kind, settings) in &self.rules {
            settings.validate(kind.as_str())?;
        }
        Ok(())
    }

    /// Stamp lifecycle settings onto a descriptor. A per-descriptor override wins.
    pub fn apply(&self, descriptor: ResourceDescriptor) -> ResourceDescriptor {
        let settings = descriptor
            .lifecycle_override()
            .unwrap_or_else(|| self.settings_for(descriptor.kind()));
        debug!(
            "Lifecycle for {} ({}): {:?}",
            descriptor.id(),
            descriptor.kind(),
            settings
        );
        descriptor.with_lifecycle(settings)
    }
}
