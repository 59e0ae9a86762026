//! Synthesis ordering.
//!
//! Kahn's algorithm over the stack graph. Among stacks that become eligible
//! at the same time, the one declared first goes first, so an unchanged
//! declaration set always yields the same order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::graph::StackGraph;

/// A valid build order plus its grouping into provisioning waves.
///
/// Every stack in wave `k` depends only on stacks in waves `< k`, so an
/// executor may provision the members of one wave in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisOrder {
    stacks: Vec<String>,
    waves: Vec<Vec<String>>,
}

impl SynthesisOrder {
    pub fn stacks(&self) -> &[String] {
        &self.stacks
    }

    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    pub fn position(&self, stack: &str) -> Option<usize> {
        self.stacks.iter().position(|s| s == stack)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

/// Topologically sorts a stack graph.
pub struct SynthesisOrderResolver;

impl SynthesisOrderResolver {
    /// Resolve a producer-before-consumer order.
    ///
    /// Works on graphs that were never checked for cycles: if nodes remain
    /// once no zero in-degree node is left, the cycle among them is reported.
    pub fn resolve(graph: &StackGraph) -> GraphResult<SynthesisOrder> {
        let n = graph.len();
        let mut in_degree: Vec<usize> = (0..n).map(|i| graph.predecessors(i).len()).collect();
        let mut wave = vec![0usize; n];

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut sorted = Vec::with_capacity(n);
        while let Some(Reverse(node)) = ready.pop() {
            sorted.push(node);
            for &next in graph.successors(node) {
                wave[next] = wave[next].max(wave[node] + 1);
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if sorted.len() != n {
            let remaining: Vec<bool> = in_degree.iter().map(|d| *d > 0).collect();
            let cycle = graph.find_cycle_within(&remaining).unwrap_or_else(|| {
                (0..n)
                    .filter(|i| remaining[*i])
                    .map(|i| graph.stacks()[i].name().to_string())
                    .collect()
            });
            return Err(GraphError::CyclicDependency { cycle });
        }

        let wave_count = wave.iter().copied().max().map_or(0, |w| w + 1);
        let mut waves = vec![Vec::new(); wave_count];
        let stacks: Vec<String> = sorted
            .iter()
            .map(|&i| {
                let name = graph.stacks()[i].name().to_string();
                waves[wave[i]].push(name.clone());
                name
            })
            .collect();

        debug!("Provisioning waves: {:?}", waves);
        info!("Resolved synthesis order: {}", stacks.join(", "));
        Ok(SynthesisOrder { stacks, waves })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ExportCatalog;
    use crate::graph::StackGraphBuilder;
    use crate::stack::{Stack, StackDeclaration};
    use weave_model::{
        CapabilityRequirement, CapabilityType, CapabilityValue, Environment, ExportDeclaration,
        NetworkFabric, NetworkLink, SynthConfig,
    };

    fn graph(declarations: &[StackDeclaration], checked: bool) -> GraphResult<StackGraph> {
        let config = SynthConfig::new(Environment::new("123456789012", "eu-north-1"));
        let catalog = ExportCatalog::from_declarations(declarations)?;
        let mut builder = StackGraphBuilder::new();
        for declaration in declarations {
            builder.add_stack(Stack::construct(declaration, &catalog, &config)?)?;
        }
        if checked {
            builder.build_graph()
        } else {
            builder.build_unchecked()
        }
    }

    fn fabric() -> ExportDeclaration {
        ExportDeclaration::new(
            "vpc",
            CapabilityValue::NetworkFabric(NetworkFabric { id: "vpc-1".to_string() }),
        )
    }

    #[test]
    fn test_independent_stacks_keep_declaration_order() {
        let declarations = vec![
            StackDeclaration::new("C"),
            StackDeclaration::new("A"),
            StackDeclaration::new("B"),
        ];
        let order = SynthesisOrderResolver::resolve(&graph(&declarations, true).unwrap()).unwrap();
        assert_eq!(order.stacks(), &["C", "A", "B"]);
        assert_eq!(order.waves().len(), 1);
    }

    #[test]
    fn test_consumer_declared_first_moves_after_producer() {
        let declarations = vec![
            StackDeclaration::new("Cluster")
                .requires(CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric)),
            StackDeclaration::new("Vpc").export(fabric()),
        ];
        let order = SynthesisOrderResolver::resolve(&graph(&declarations, true).unwrap()).unwrap();
        assert_eq!(order.stacks(), &["Vpc", "Cluster"]);
        assert_eq!(order.waves(), &[vec!["Vpc".to_string()], vec!["Cluster".to_string()]]);
    }

    #[test]
    fn test_unchecked_cycle_detected_by_resolver() {
        let declarations = vec![
            StackDeclaration::new("Root"),
            StackDeclaration::new("A")
                .export(fabric())
                .requires(CapabilityRequirement::new("link", CapabilityType::NetworkLink)),
            StackDeclaration::new("B")
                .export(ExportDeclaration::new(
                    "link",
                    CapabilityValue::NetworkLink(NetworkLink { id: "link-1".to_string() }),
                ))
                .requires(CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric)),
        ];
        let graph = graph(&declarations, false).unwrap();
        let err = SynthesisOrderResolver::resolve(&graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicDependency {
                cycle: vec!["A".to_string(), "B".to_string()]
            }
        );
    }
}
