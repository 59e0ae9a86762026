//! Synthesis configuration: target environment, tags and lifecycle table.
//!
//! Passed explicitly into every construction call so synthesis stays a pure
//! function of its inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::lifecycle::LifecyclePolicy;

/// Target account and region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.account.len() != 12 || !self.account.chars().all(|c| c.is_ascii_digit()) {
            return Err(ModelError::InvalidEnvironment(format!(
                "account '{}' must be a 12-digit identifier",
                self.account
            )));
        }
        if self.region.trim().is_empty() {
            return Err(ModelError::InvalidEnvironment("region cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration shared by every stack in one synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub environment: Environment,
    pub tags: BTreeMap<String, String>,
    pub lifecycle: LifecyclePolicy,
}

impl SynthConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            tags: BTreeMap::new(),
            lifecycle: LifecyclePolicy::standard(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecyclePolicy) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        self.environment.validate()?;
        self.lifecycle.validate()
    }

    /// Global tags with a stack's own tags layered on top.
    pub fn merged_tags(&self, stack_tags: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.extend(stack_tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_validation() {
        assert!(Environment::new("199840700690", "eu-north-1").validate().is_ok());
        assert!(Environment::new("1998", "eu-north-1").validate().is_err());
        assert!(Environment::new("199840700690", " ").validate().is_err());
    }

    #[test]
    fn test_stack_tags_override_global() {
        let config = SynthConfig::new(Environment::new("199840700690", "eu-north-1"))
            .with_tag("team", "KucharskiCode")
            .with_tag("cost", "EcommerceInfra");

        let mut stack_tags = BTreeMap::new();
        stack_tags.insert("cost".to_string(), "ProductsService".to_string());

        let merged = config.merged_tags(&stack_tags);
        assert_eq!(merged["team"], "KucharskiCode");
        assert_eq!(merged["cost"], "ProductsService");
    }
}
