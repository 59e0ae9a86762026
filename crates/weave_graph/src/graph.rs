//! Stack dependency graph.
//!
//! Edges are never declared directly. They are derived from each stack's
//! bindings: a binding of consumer `C` to an export of producer `P` yields the
//! edge `P -> C`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::stack::Stack;

/// A producer-before-consumer edge between two stacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub producer: String,
    pub consumer: String,
    /// Consumer slots bound to the producer's exports.
    pub slots: Vec<String>,
}

/// Collects constructed stacks and derives the dependency graph.
#[derive(Debug, Default)]
pub struct StackGraphBuilder {
    stacks: Vec<Stack>,
    index: HashMap<String, usize>,
}

impl StackGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack. Declaration order is the order of registration.
    pub fn add_stack(&mut self, stack: Stack) -> GraphResult<()> {
        if self.index.contains_key(stack.name()) {
            return Err(GraphError::DuplicateStack(stack.name().to_string()));
        }
        debug!("Registering stack: {}", stack.name());
        self.index.insert(stack.name().to_string(), self.stacks.len());
        self.stacks.push(stack);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Derive edges and reject cycles.
    pub fn build_graph(self) -> GraphResult<StackGraph> {
        let graph = self.build_unchecked()?;
        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::CyclicDependency { cycle });
        }
        info!(
            "Built stack graph: {} stacks, {} edges",
            graph.len(),
            graph.edges().len()
        );
        Ok(graph)
    }

    /// Derive edges without checking for cycles.
    pub fn build_unchecked(self) -> GraphResult<StackGraph> {
        let n = self.stacks.len();
        let mut grouped: BTreeMap<(usize, usize), Vec<String>> = BTreeMap::new();

        for (consumer, stack) in self.stacks.iter().enumerate() {
            for binding in stack.bindings() {
                let producer = *self
                    .index
                    .get(binding.producer())
                    .ok_or_else(|| GraphError::UnknownStack(binding.producer().to_string()))?;
                grouped
                    .entry((producer, consumer))
                    .or_default()
                    .push(binding.slot().to_string());
            }
        }

        let mut successors = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];
        let mut edges = Vec::with_capacity(grouped.len());
        for ((producer, consumer), slots) in grouped {
            successors[producer].push(consumer);
            predecessors[consumer].push(producer);
            debug!(
                "Edge {} -> {} via {:?}",
                self.stacks[producer].name(),
                self.stacks[consumer].name(),
                slots
            );
            edges.push(DependencyEdge {
                producer: self.stacks[producer].name().to_string(),
                consumer: self.stacks[consumer].name().to_string(),
                slots,
            });
        }

        Ok(StackGraph {
            stacks: self.stacks,
            index: self.index,
            edges,
            successors,
            predecessors,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Stacks plus derived edges. Node indices follow declaration order.
#[derive(Debug, Clone)]
pub struct StackGraph {
    stacks: Vec<Stack>,
    index: HashMap<String, usize>,
    edges: Vec<DependencyEdge>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl StackGraph {
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.index_of(name).map(|i| &self.stacks[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Consumers of node `index`, ascending.
    pub fn successors(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    /// Producers of node `index`, ascending.
    pub fn predecessors(&self, index: usize) -> &[usize] {
        &self.predecessors[index]
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn into_stacks(self) -> Vec<Stack> {
        self.stacks
    }

    /// First cycle found by depth-first traversal, as stack names in edge order.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        self.find_cycle_within(&vec![true; self.len()])
    }

    /// Like [`find_cycle`](Self::find_cycle), restricted to nodes where `include` is set.
    pub(crate) fn find_cycle_within(&self, include: &[bool]) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.len()];

        for start in 0..self.len() {
            if include[start] && marks[start] == Mark::Unvisited {
                if let Some(cycle) = self.visit(start, include, &mut marks) {
                    return Some(
                        cycle
                            .into_iter()
                            .map(|i| self.stacks[i].name().to_string())
                            .collect(),
                    );
                }
            }
        }
        None
    }

    /// Depth-first walk from `start` on an explicit stack, so chain length is
    /// bounded by the heap rather than the call stack.
    fn visit(&self, start: usize, include: &[bool], marks: &mut [Mark]) -> Option<Vec<usize>> {
        // Each frame is a node on the current path and the next successor to try.
        let mut path: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::InProgress;

        while let Some(frame) = path.last_mut() {
            let node = frame.0;
            let Some(&next) = self.successors[node].get(frame.1) else {
                marks[node] = Mark::Done;
                path.pop();
                continue;
            };
            frame.1 += 1;

            if !include[next] {
                continue;
            }
            match marks[next] {
                Mark::InProgress => {
                    let begin = path.iter().position(|&(n, _)| n == next)?;
                    return Some(path[begin..].iter().map(|&(n, _)| n).collect());
                }
                Mark::Unvisited => {
                    marks[next] = Mark::InProgress;
                    path.push((next, 0));
                }
                Mark::Done => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::ExportCatalog;
    use crate::stack::StackDeclaration;
    use weave_model::{
        CapabilityRequirement, CapabilityType, CapabilityValue, Environment, ExportDeclaration,
        NetworkFabric, NetworkLink, SynthConfig,
    };

    fn fabric(name: &str) -> ExportDeclaration {
        ExportDeclaration::new(
            name,
            CapabilityValue::NetworkFabric(NetworkFabric { id: name.to_string() }),
        )
    }

    fn link(name: &str) -> ExportDeclaration {
        ExportDeclaration::new(name, CapabilityValue::NetworkLink(NetworkLink { id: name.to_string() }))
    }

    fn builder(declarations: &[StackDeclaration]) -> StackGraphBuilder {
        let config = SynthConfig::new(Environment::new("123456789012", "eu-north-1"));
        let catalog = ExportCatalog::from_declarations(declarations).unwrap();
        let mut builder = StackGraphBuilder::new();
        for declaration in declarations {
            builder
                .add_stack(Stack::construct(declaration, &catalog, &config).unwrap())
                .unwrap();
        }
        builder
    }

    #[test]
    fn test_edges_derived_from_bindings() {
        let declarations = vec![
            StackDeclaration::new("Vpc").export(fabric("vpc")),
            StackDeclaration::new("Cluster")
                .requires(CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric)),
        ];
        let graph = builder(&declarations).build_graph().unwrap();

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].producer, "Vpc");
        assert_eq!(graph.edges()[0].consumer, "Cluster");
        assert_eq!(graph.edges()[0].slots, vec!["vpc"]);
        assert_eq!(graph.successors(0), &[1]);
        assert_eq!(graph.predecessors(1), &[0]);
    }

    #[test]
    fn test_cycle_reports_both_stacks() {
        let declarations = vec![
            StackDeclaration::new("A")
                .export(fabric("fabric"))
                .requires(CapabilityRequirement::new("link", CapabilityType::NetworkLink)),
            StackDeclaration::new("B")
                .export(link("link"))
                .requires(CapabilityRequirement::new("fabric", CapabilityType::NetworkFabric)),
        ];

        let err = builder(&declarations).build_graph().unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicDependency {
                cycle: vec!["A".to_string(), "B".to_string()]
            }
        );
    }

    #[test]
    fn test_duplicate_stack_rejected() {
        let declarations = vec![StackDeclaration::new("Vpc")];
        let mut builder = builder(&declarations);
        let catalog = ExportCatalog::new();
        let config = SynthConfig::new(Environment::new("123456789012", "eu-north-1"));
        let again = Stack::construct(&declarations[0], &catalog, &config).unwrap();

        assert_eq!(
            builder.add_stack(again),
            Err(GraphError::DuplicateStack("Vpc".to_string()))
        );
    }

    fn chain(length: usize, closed: bool) -> StackGraph {
        let config = SynthConfig::new(Environment::new("123456789012", "eu-north-1"));
        let catalog = ExportCatalog::new();
        let stacks: Vec<Stack> = (0..length)
            .map(|i| Stack::construct(&StackDeclaration::new(format!("S{i}")), &catalog, &config).unwrap())
            .collect();
        let index = stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name().to_string(), i))
            .collect();
        let last = length - 1;
        let successors = (0..length)
            .map(|i| match i {
                i if i < last => vec![i + 1],
                _ if closed => vec![0],
                _ => Vec::new(),
            })
            .collect();
        let predecessors = (0..length)
            .map(|i| match i {
                0 if closed => vec![last],
                0 => Vec::new(),
                i => vec![i - 1],
            })
            .collect();

        StackGraph {
            stacks,
            index,
            edges: Vec::new(),
            successors,
            predecessors,
        }
    }

    #[test]
    fn test_long_chain_cycle_search() {
        let length = 50_000;
        assert_eq!(chain(length, false).find_cycle(), None);

        let cycle = chain(length, true).find_cycle().unwrap();
        assert_eq!(cycle.len(), length);
        assert_eq!(cycle[0], "S0");
        assert_eq!(cycle[length - 1], format!("S{}", length - 1));
    }

    #[test]
    fn test_cycle_reported_from_its_entry_point() {
        let declarations = vec![
            StackDeclaration::new("Vpc").export(fabric("vpc")),
            StackDeclaration::new("A")
                .requires(CapabilityRequirement::new("vpc", CapabilityType::NetworkFabric))
                .requires(CapabilityRequirement::new("link", CapabilityType::NetworkLink))
                .export(link("a_link")),
            StackDeclaration::new("B")
                .requires(
                    CapabilityRequirement::new("a_link", CapabilityType::NetworkLink)
                        .from_export("A", "a_link"),
                )
                .export(link("link")),
        ];
        let err = builder(&declarations).build_graph().unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicDependency {
                cycle: vec!["A".to_string(), "B".to_string()]
            }
        );
    }
}
