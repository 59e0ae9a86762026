//! Capability binding.
//!
//! A requirement binds to exactly one export of its declared type. Zero
//! candidates is a missing capability; more than one is ambiguous and must be
//! resolved by the declaration naming an explicit producer, never by guessing.

use std::collections::HashSet;

use tracing::debug;

use weave_model::{CapabilityExport, CapabilityRequirement};

use crate::error::{GraphError, GraphResult};
use crate::stack::{check_stack_name, StackDeclaration};

/// Resolves requirement slots against candidate exports.
pub struct CapabilityBinder;

impl CapabilityBinder {
    /// Bind `requirement` of stack `consumer` against `candidates`.
    ///
    /// A stack's own exports are never candidates for its requirements.
    pub fn bind(
        consumer: &str,
        requirement: &CapabilityRequirement,
        candidates: &[CapabilityExport],
    ) -> GraphResult<CapabilityExport> {
        let matches: Vec<&CapabilityExport> = candidates
            .iter()
            .filter(|export| export.producer != consumer && requirement.accepts(export))
            .collect();

        match matches.as_slice() {
            [] => Err(GraphError::MissingCapability {
                consumer: consumer.to_string(),
                slot: requirement.slot.clone(),
                capability: requirement.capability,
            }),
            [export] => {
                debug!(
                    "Bound {}.{} -> {}",
                    consumer,
                    requirement.slot,
                    export.qualified_name()
                );
                Ok((*export).clone())
            }
            many => Err(GraphError::AmbiguousCapability {
                consumer: consumer.to_string(),
                slot: requirement.slot.clone(),
                capability: requirement.capability,
                candidates: many.iter().map(|e| e.qualified_name()).collect(),
            }),
        }
    }
}

/// Every export declared across a declaration set, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ExportCatalog {
    exports: Vec<CapabilityExport>,
}

impl ExportCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect exports from declarations, rejecting duplicate names within a
    /// stack and stack names [`Stack::construct`](crate::Stack::construct) would refuse.
    pub fn from_declarations(declarations: &[StackDeclaration]) -> GraphResult<Self> {
        let mut catalog = Self::new();
        for declaration in declarations {
            check_stack_name(&declaration.name)?;
            let mut seen = HashSet::new();
            for export in &declaration.exports {
                if !seen.insert(export.name.as_str()) {
                    return Err(GraphError::DuplicateExport {
                        stack: declaration.name.clone(),
                        export: export.name.clone(),
                    });
                }
                catalog
                    .exports
                    .push(CapabilityExport::new(&declaration.name, export.clone()));
            }
        }
        debug!("Export catalog holds {} exports", catalog.exports.len());
        Ok(catalog)
    }

    pub fn exports(&self) -> &[CapabilityExport] {
        &self.exports
    }

    pub fn exports_of<'a>(&'a self, stack: &'a str) -> impl Iterator<Item = &'a CapabilityExport> + 'a {
        self.exports.iter().filter(move |e| e.producer == stack)
    }

    pub fn find(&self, stack: &str, export: &str) -> Option<&CapabilityExport> {
        self.exports
            .iter()
            .find(|e| e.producer == stack && e.name == export)
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::{
        CapabilityType, CapabilityValue, ExportDeclaration, ListenerKind, NetworkEndpoint,
        NetworkFabric,
    };

    fn fabric(producer: &str) -> CapabilityExport {
        CapabilityExport::new(
            producer,
            ExportDeclaration::new(
                "vpc",
                CapabilityValue::NetworkFabric(NetworkFabric {
                    id: format!("{}-vpc", producer),
                }),
            ),
        )
    }

    fn endpoint(producer: &str, name: &str) -> CapabilityExport {
        CapabilityExport::new(
            producer,
            ExportDeclaration::new(
                name,
                CapabilityValue::NetworkEndpoint(NetworkEndpoint {
                    dns_name: format!("{}.elb.amazonaws.com", name),
                    port: 8080,
                    balancer: ListenerKind::Network,
                }),
            ),
        )
    }

    #[test]
    fn test_bind_single_match() {
        let candidates = vec![fabric("Vpc"), endpoint("Nlb", "nlb")];
        let requirement = CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric);

        let export = CapabilityBinder::bind("Cluster", &requirement, &candidates).unwrap();
        assert_eq!(export.producer, "Vpc");
    }

    #[test]
    fn test_bind_missing() {
        let candidates = vec![endpoint("Nlb", "nlb")];
        let requirement = CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric);

        let err = CapabilityBinder::bind("Cluster", &requirement, &candidates).unwrap_err();
        assert!(matches!(err, GraphError::MissingCapability { ref slot, .. } if slot == "vpc"));
    }

    #[test]
    fn test_bind_ambiguous_then_disambiguated() {
        let candidates = vec![endpoint("Nlb", "nlb"), endpoint("Nlb", "alb")];
        let requirement = CapabilityRequirement::new("lb", CapabilityType::NetworkEndpoint);

        let err = CapabilityBinder::bind("Api", &requirement, &candidates).unwrap_err();
        match err {
            GraphError::AmbiguousCapability { candidates, .. } => {
                assert_eq!(candidates, vec!["Nlb.nlb", "Nlb.alb"]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let requirement = requirement.from_export("Nlb", "nlb");
        let export = CapabilityBinder::bind("Api", &requirement, &candidates).unwrap();
        assert_eq!(export.name, "nlb");
    }

    #[test]
    fn test_own_export_is_not_a_candidate() {
        let candidates = vec![fabric("Vpc")];
        let requirement = CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric);
        assert!(CapabilityBinder::bind("Vpc", &requirement, &candidates).is_err());
    }
}
