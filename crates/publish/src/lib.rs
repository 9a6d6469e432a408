//! Publish-time file resolution for depship.
//!
//! Given the resolved graph of one (framework, runtime) target, this crate
//! decides which package files a published app must carry, drops what a
//! platform or package store already supplies, and builds the runtime
//! dependency manifest.
//!
//! # Flow
//!
//! 1. [`ProjectContext::create`] selects a target out of an [`AssetsDocument`]
//!    and computes the names the platform already supplies.
//! 2. [`PublishResolver`] walks the remaining package nodes and emits
//!    [`ResolvedFile`]s, recording each package in a
//!    [`ResolvedPackageRegistry`].
//! 3. [`prune_files`] drops files of packages in the closure of a set of seeds.
//! 4. [`manifest::build`] assembles the [`DependencyManifest`], leaving out
//!    the closures of packages listed by filter sources.
//!
//! # Example
//!
//! ```
//! use depship_graph::{DependencyGraph, GraphNode, PackageIdentity};
//! use depship_publish::{AssetKind, PackageFile, ResolvedFile, prune_files};
//!
//! let graph = DependencyGraph::from_nodes([
//!     GraphNode::platform("Platform", "1.0").with_dependency("Shared", "2.0"),
//!     GraphNode::package("Shared", "2.0"),
//!     GraphNode::package("AppLib", "1.0"),
//! ]);
//!
//! let files = vec![
//!     PackageFile::new(
//!         ResolvedFile::new("/packages/shared/2.0/lib/Shared.dll", None, AssetKind::Runtime),
//!         PackageIdentity::new("Shared", "2.0"),
//!     ),
//!     PackageFile::new(
//!         ResolvedFile::new("/packages/applib/1.0/lib/AppLib.dll", None, AssetKind::Runtime),
//!         PackageIdentity::new("AppLib", "1.0"),
//!     ),
//! ];
//!
//! let outcome = prune_files(files, ["Platform"], &graph).unwrap();
//! assert_eq!(outcome.pruned.len(), 1);
//! assert_eq!(outcome.published_packages, vec![PackageIdentity::new("AppLib", "1.0")]);
//! ```

mod asset;
mod context;
mod error;
mod locator;
pub mod manifest;
mod options;
mod prune;
mod registry;
mod resolver;

pub use asset::{AssetKind, PLACEHOLDER_FILE_NAME, PackageFile, ResolvedFile, is_placeholder};
pub use context::{AssetsDocument, ContextRequest, ProjectContext, TargetFramework, TargetSection};
pub use error::{Error, Result};
pub use locator::{FolderPackageLocator, PackageLocation, PackageLocator};
pub use manifest::{
    CompilationOptions, DependencyManifest, FilterSource, ManifestConfig, ProjectInfo,
    PrunedPackage, ReferenceInfo, RuntimeTarget, SatelliteAssembly,
};
pub use options::PublishOptions;
pub use prune::{PruneOutcome, partition, prune_files};
pub use registry::{ResolvedPackageList, ResolvedPackageRegistry};
pub use resolver::PublishResolver;
