//! Error types for publish resolution.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving publish output.
///
/// None of these are transient; callers should abort the current resolution.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The assets document has no section for the requested target.
    #[error(
        "Assets file '{path}' doesn't have a target for '{target_moniker}'. Ensure that restore has run and that you have included '{framework_short_name}' in the target frameworks{}",
        runtime_hint(runtime.as_deref())
    )]
    #[diagnostic(
        code(depship::publish::target_not_found),
        help("Restore the project again for the requested framework and runtime identifier")
    )]
    TargetNotFound {
        /// Path of the assets document.
        path: PathBuf,
        /// `framework` or `framework/runtime`.
        target_moniker: String,
        /// Short folder name of the framework, e.g. `netcoreapp1.0`.
        framework_short_name: String,
        /// Requested runtime identifier, if any.
        runtime: Option<String>,
    },

    /// The filter assets document has no section for the requested target.
    #[error(
        "Filter assets file '{path}' doesn't have a target for '{target_moniker}'{}",
        runtime_hint(runtime.as_deref())
    )]
    #[diagnostic(
        code(depship::publish::filter_target_not_found),
        help("The filter document must be restored for the same framework and runtime as the project")
    )]
    FilterTargetNotFound {
        /// Path of the filter assets document.
        path: PathBuf,
        /// `framework` or `framework/runtime`.
        target_moniker: String,
        /// Short folder name of the framework.
        framework_short_name: String,
        /// Requested runtime identifier, if any.
        runtime: Option<String>,
    },

    /// A package was registered after the resolved-package registry was sealed.
    #[error("Cannot register '{package}': the resolved package list has already been read")]
    #[diagnostic(
        code(depship::publish::registry_sealed),
        help(
            "Finish every resolution in the build session before reading the resolved package list, or reset the registry for a new session"
        )
    )]
    RegistrySealed {
        /// The package that could not be registered.
        package: String,
    },

    /// An install path does not live under the shared package root.
    #[error("The package root '{package_root}' is incorrect for the resolved path '{path}'")]
    #[diagnostic(
        code(depship::publish::package_root_mismatch),
        help("Check the package folders configured for the package locator")
    )]
    PackageRootMismatch {
        /// The claimed shared package root.
        package_root: PathBuf,
        /// The resolved file path outside of it.
        path: PathBuf,
    },

    /// The resolved graph is inconsistent.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] depship_graph::Error),
}

impl Error {
    /// Create a registry sealed error.
    #[must_use]
    pub fn registry_sealed(package: impl Into<String>) -> Self {
        Self::RegistrySealed {
            package: package.into(),
        }
    }

    /// Create a package root mismatch error.
    #[must_use]
    pub fn package_root_mismatch(package_root: &Path, path: &Path) -> Self {
        Self::PackageRootMismatch {
            package_root: package_root.to_path_buf(),
            path: path.to_path_buf(),
        }
    }
}

fn runtime_hint(runtime: Option<&str>) -> String {
    runtime
        .filter(|rid| !rid.is_empty())
        .map(|rid| format!(" and '{rid}' in the runtime identifiers"))
        .unwrap_or_default()
}
