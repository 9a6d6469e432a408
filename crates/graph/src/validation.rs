//! Validation utilities for dependency graphs.
//!
//! The closure algorithms assume a closed-world, acyclic graph. Graph
//! providers can call [`DependencyGraph::validate`] up front to surface both
//! problems before any resolution starts.

use crate::{DependencyGraph, Error};

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid (no cycles, no missing dependencies).
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }

    /// Convert into a `Result`, yielding the first error if invalid.
    ///
    /// # Errors
    ///
    /// Returns the first recorded validation error.
    pub fn into_result(self) -> crate::Result<()> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl DependencyGraph {
    /// Validate the graph structure.
    ///
    /// Checks for:
    /// - Dependency references with no node in the graph
    /// - Cycles in the dependency graph
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if !self.unresolved_dependencies().is_empty() {
            errors.push(Error::MissingDependencies {
                missing: self.unresolved_dependencies().to_vec(),
            });
        }

        if self.has_cycles() {
            errors.push(Error::CycleDetected {
                message: "Resolved dependency graph contains cycles".to_string(),
            });
        }

        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }
}
