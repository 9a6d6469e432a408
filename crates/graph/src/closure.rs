//! Closure and intersection algorithms over a [`DependencyGraph`].
//!
//! A closure answers "which libraries does this seed already supply?". Only
//! dependencies whose resolved version is exactly the version the seed
//! declares are followed; anything that diverged is left out together with
//! its whole subtree.
//!
//! # Preconditions
//!
//! The graph must be acyclic. Traversal has no cycle guard beyond the set of
//! names already collected, which is enough to terminate but not to give a
//! meaningful answer on a cyclic graph. Use
//! [`DependencyGraph::validate`] when the provider cannot guarantee this.

use crate::identity::NameSet;
use crate::node::GraphNode;
use crate::{DependencyGraph, Error, Result};
use tracing::{debug, trace};

/// Compute the transitive closure of `seed` within `graph`.
///
/// The seed itself is always part of the closure. A dependency is added, and
/// descended into, only when the node it resolves to has a version equal to
/// the dependency's declared minimum version.
///
/// # Errors
///
/// Returns [`Error::MissingDependency`] if a dependency reference reached from
/// the seed has no node in `graph`.
pub fn transitive_closure(graph: &DependencyGraph, seed: &GraphNode) -> Result<NameSet> {
    let mut closure = NameSet::new();
    closure.insert(seed.name());

    let mut frontier: Vec<&GraphNode> = vec![seed];

    while let Some(node) = frontier.pop() {
        for dep in graph.dependencies_of(node) {
            let library = graph
                .node(&dep.id)
                .ok_or_else(|| Error::missing_dependency(node.name(), &dep.id))?;

            if library.version() != &dep.min_version {
                trace!(
                    seed = %seed.identity,
                    library = %library.identity,
                    declared = %dep.min_version,
                    "Dependency diverged from declared version, not following"
                );
                continue;
            }

            if closure.insert(library.name()) {
                frontier.push(library);
            }
        }
    }

    debug!(seed = %seed.identity, size = closure.len(), "Computed transitive closure");
    Ok(closure)
}

/// Compute the closure of the node named `seed`.
///
/// A seed that is not in the graph yields a closure containing just its own
/// name; there is nothing to traverse.
///
/// # Errors
///
/// Returns [`Error::MissingDependency`] if the graph is inconsistent below the
/// seed.
pub fn closure_of(graph: &DependencyGraph, seed: &str) -> Result<NameSet> {
    match graph.node(seed) {
        Some(node) => transitive_closure(graph, node),
        None => {
            debug!(seed, "Closure seed has no node in the graph");
            Ok(std::iter::once(seed).collect())
        }
    }
}

/// Union of the closures of every seed.
///
/// Empty seed names are ignored. The result does not depend on seed order.
///
/// # Errors
///
/// Returns the first [`Error::MissingDependency`] hit by any seed's closure.
pub fn union_closure<'a>(
    graph: &DependencyGraph,
    seeds: impl IntoIterator<Item = &'a str>,
) -> Result<NameSet> {
    let mut union = NameSet::new();
    for seed in seeds.into_iter().filter(|seed| !seed.is_empty()) {
        union.extend_from(&closure_of(graph, seed)?);
    }
    Ok(union)
}

/// Names present in both graphs with the same resolved version.
///
/// Iterates the smaller graph and looks names up in the larger one; names
/// missing from the larger graph are skipped.
#[must_use]
pub fn intersect(first: &DependencyGraph, second: &DependencyGraph) -> NameSet {
    let (iter, lookup) = if first.len() > second.len() {
        (second, first)
    } else {
        (first, second)
    };

    iter.nodes()
        .filter(|node| {
            lookup
                .node(node.name())
                .is_some_and(|other| other.version() == node.version())
        })
        .map(GraphNode::name)
        .collect()
}
