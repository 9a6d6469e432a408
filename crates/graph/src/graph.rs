//! Resolved dependency graph using petgraph.
//!
//! A [`DependencyGraph`] is a read-only view over the libraries resolved for
//! one (target framework, runtime identifier) pair. Nodes are keyed by
//! case-insensitive name; edges point from a dependency to its dependent.

use crate::identity::{ExclusionSet, name_key};
use crate::node::{DependencyRef, GraphNode};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// Dependency graph for one resolved target.
///
/// Construction never fails: references that do not resolve are recorded and
/// reported by [`DependencyGraph::validate`]. The
/// closure algorithms treat such a reference as a fatal inconsistency.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// The directed graph of libraries.
    graph: DiGraph<GraphNode, ()>,
    /// Map from lowercased library names to node indices.
    name_to_node: HashMap<String, NodeIndex>,
    /// (package, dependency) pairs whose dependency has no node.
    unresolved: Vec<(String, String)>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from provider-supplied nodes and link their dependencies.
    #[must_use]
    pub fn from_nodes(nodes: impl IntoIterator<Item = GraphNode>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph.link_dependencies();
        graph
    }

    /// Add a single node to the graph.
    ///
    /// If a node with the same name already exists, the new node is dropped
    /// and the existing index is returned.
    fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let key = name_key(node.name());
        if let Some(&existing) = self.name_to_node.get(&key) {
            warn!(
                library = %node.identity,
                "Duplicate library in resolved graph, keeping the first entry"
            );
            return existing;
        }

        debug!(library = %node.identity, kind = ?node.kind, "Added library node");
        let index = self.graph.add_node(node);
        self.name_to_node.insert(key, index);
        index
    }

    /// Add dependency edges once all nodes are present.
    fn link_dependencies(&mut self) {
        let mut edges = Vec::new();

        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            for dep in &node.dependencies {
                if let Some(&dep_index) = self.name_to_node.get(&name_key(&dep.id)) {
                    edges.push((dep_index, index));
                } else {
                    trace!(
                        library = %node.identity,
                        dependency = %dep.id,
                        "Dependency has no resolved node"
                    );
                    self.unresolved.push((node.name().to_string(), dep.id.clone()));
                }
            }
        }

        for (from, to) in edges {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Look up a node by case-insensitive name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.name_to_node
            .get(&name_key(name))
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Check if a node exists in the graph.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_node.contains_key(&name_key(name))
    }

    /// Iterate over all nodes in provider order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Iterate over the nodes whose names are not in `exclusion`.
    pub fn nodes_excluding<'a>(
        &'a self,
        exclusion: &'a ExclusionSet,
    ) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes()
            .filter(move |node| !exclusion.contains(node.name()))
    }

    /// Direct dependencies of `node`, in declaration order.
    #[must_use]
    pub fn dependencies_of<'a>(&self, node: &'a GraphNode) -> &'a [DependencyRef] {
        &node.dependencies
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Dependency references that did not resolve to a node.
    #[must_use]
    pub fn unresolved_dependencies(&self) -> &[(String, String)] {
        &self.unresolved
    }
}

impl FromIterator<GraphNode> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = GraphNode>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}
