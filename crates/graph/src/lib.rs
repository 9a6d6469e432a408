//! Resolved dependency graph model and closure algorithms for depship.
//!
//! This crate holds the read-only view over a resolved target's libraries and
//! the algorithms that decide which of them a baseline already supplies.
//!
//! # Key Types
//!
//! - [`PackageIdentity`]: a package name pinned to an exact [`PackageVersion`]
//! - [`GraphNode`]: one resolved library with its dependencies and asset groups
//! - [`DependencyGraph`]: the libraries of one (framework, runtime) pair
//! - [`NameSet`]: case-insensitive name set used for closures and exclusions
//!
//! # Example
//!
//! ```
//! use depship_graph::{DependencyGraph, GraphNode, closure_of};
//!
//! let graph = DependencyGraph::from_nodes([
//!     GraphNode::platform("Platform", "1.0").with_dependency("Shared", "2.0"),
//!     GraphNode::package("Shared", "2.0"),
//!     GraphNode::package("AppLib", "1.0"),
//! ]);
//!
//! let supplied = closure_of(&graph, "Platform").unwrap();
//! assert!(supplied.contains("Shared"));
//! assert!(!supplied.contains("AppLib"));
//! ```

mod closure;
mod error;
mod graph;
mod identity;
mod node;
mod validation;

pub use closure::{closure_of, intersect, transitive_closure, union_closure};
pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use identity::{ExclusionSet, NameSet, PackageIdentity, PackageVersion, name_key};
pub use node::{DependencyRef, GraphNode, NodeKind, ResourceAsset, RuntimeTargetAsset};
pub use validation::ValidationResult;
