//! Error types for dependency graph operations.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for dependency graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying or validating a dependency graph.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// A dependency reference points at a node that is not part of the graph.
    #[error("Package '{package}' depends on '{dependency}', which is missing from the graph")]
    #[diagnostic(
        code(depship::graph::missing_dependency),
        help(
            "The resolved graph is inconsistent. Regenerate the assets document so every dependency has a resolved entry"
        )
    )]
    MissingDependency {
        /// The node that declares the dependency.
        package: String,
        /// The dependency id that could not be found.
        dependency: String,
    },

    /// Several dependency references point at nodes absent from the graph.
    #[error("Missing dependencies: {}", format_missing(missing))]
    #[diagnostic(
        code(depship::graph::missing_dependencies),
        help(
            "The resolved graph is inconsistent. Regenerate the assets document so every dependency has a resolved entry"
        )
    )]
    MissingDependencies {
        /// List of (package, missing dependency) pairs.
        missing: Vec<(String, String)>,
    },

    /// A dependency cycle was detected in the graph.
    #[error("Cycle detected in dependency graph: {message}")]
    #[diagnostic(
        code(depship::graph::cycle_detected),
        help("Resolved dependency graphs must be acyclic")
    )]
    CycleDetected {
        /// Human-readable description of the cycle.
        message: String,
    },
}

impl Error {
    /// Create a missing dependency error.
    #[must_use]
    pub fn missing_dependency(package: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            package: package.into(),
            dependency: dependency.into(),
        }
    }
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(package, dep)| format!("Package '{package}' depends on missing '{dep}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
