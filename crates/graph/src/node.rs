//! Graph node model.
//!
//! Nodes are supplied by the graph provider and never mutated by the
//! algorithms in this workspace. The `with_*` helpers exist so providers and
//! tests can assemble nodes without spelling out every asset group.

use crate::identity::{PackageIdentity, PackageVersion};
use serde::{Deserialize, Serialize};

/// What a node in the resolved graph represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A project reference inside the same build.
    Project,
    /// A package restored from a package source.
    Package,
    /// A platform package that supplies a shared runtime.
    Platform,
}

/// A declared dependency on another node of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRef {
    /// Name of the dependency; resolves to a node by case-insensitive lookup.
    pub id: String,
    /// Lower bound of the declared version range.
    pub min_version: PackageVersion,
}

impl DependencyRef {
    /// Create a dependency reference.
    #[must_use]
    pub fn new(id: impl Into<String>, min_version: impl Into<PackageVersion>) -> Self {
        Self {
            id: id.into(),
            min_version: min_version.into(),
        }
    }
}

/// A localized resource assembly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAsset {
    /// Path relative to the package install directory.
    pub path: String,
    /// Culture tag such as `fr` or `zh-Hans`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// An asset that only applies to one runtime identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeTargetAsset {
    /// Path relative to the package install directory.
    pub path: String,
    /// Runtime identifier the asset applies to, e.g. `win7-x64`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Free-form kind tag; `native` and `runtime` are published.
    pub asset_kind: String,
}

/// One resolved package, project or platform in a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Name and exact resolved version.
    pub identity: PackageIdentity,
    /// Node kind tag.
    pub kind: NodeKind,
    /// Direct dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
    /// Managed assemblies loaded at runtime.
    #[serde(default)]
    pub runtime_assemblies: Vec<String>,
    /// Native libraries.
    #[serde(default)]
    pub native_libraries: Vec<String>,
    /// Localized resource assemblies.
    #[serde(default)]
    pub resource_assemblies: Vec<ResourceAsset>,
    /// Runtime-identifier specific assets.
    #[serde(default)]
    pub runtime_targets: Vec<RuntimeTargetAsset>,
}

impl GraphNode {
    /// Create a node with no dependencies or assets.
    #[must_use]
    pub fn new(kind: NodeKind, name: impl Into<String>, version: impl Into<PackageVersion>) -> Self {
        Self {
            identity: PackageIdentity::new(name, version),
            kind,
            dependencies: Vec::new(),
            runtime_assemblies: Vec::new(),
            native_libraries: Vec::new(),
            resource_assemblies: Vec::new(),
            runtime_targets: Vec::new(),
        }
    }

    /// Create a `package` node.
    #[must_use]
    pub fn package(name: impl Into<String>, version: impl Into<PackageVersion>) -> Self {
        Self::new(NodeKind::Package, name, version)
    }

    /// Create a `project` node.
    #[must_use]
    pub fn project(name: impl Into<String>, version: impl Into<PackageVersion>) -> Self {
        Self::new(NodeKind::Project, name, version)
    }

    /// Create a `platform` node.
    #[must_use]
    pub fn platform(name: impl Into<String>, version: impl Into<PackageVersion>) -> Self {
        Self::new(NodeKind::Platform, name, version)
    }

    /// The node's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// The node's resolved version.
    #[must_use]
    pub fn version(&self) -> &PackageVersion {
        &self.identity.version
    }

    /// Add a dependency on `id` declared with lower bound `min_version`.
    #[must_use]
    pub fn with_dependency(
        mut self,
        id: impl Into<String>,
        min_version: impl Into<PackageVersion>,
    ) -> Self {
        self.dependencies.push(DependencyRef::new(id, min_version));
        self
    }

    /// Add a runtime assembly path.
    #[must_use]
    pub fn with_runtime_assembly(mut self, path: impl Into<String>) -> Self {
        self.runtime_assemblies.push(path.into());
        self
    }

    /// Add a native library path.
    #[must_use]
    pub fn with_native_library(mut self, path: impl Into<String>) -> Self {
        self.native_libraries.push(path.into());
        self
    }

    /// Add a resource assembly, optionally tagged with a locale.
    #[must_use]
    pub fn with_resource_assembly(mut self, path: impl Into<String>, locale: Option<&str>) -> Self {
        self.resource_assemblies.push(ResourceAsset {
            path: path.into(),
            locale: locale.map(String::from),
        });
        self
    }

    /// Add a runtime-target asset.
    #[must_use]
    pub fn with_runtime_target(
        mut self,
        path: impl Into<String>,
        runtime: Option<&str>,
        asset_kind: impl Into<String>,
    ) -> Self {
        self.runtime_targets.push(RuntimeTargetAsset {
            path: path.into(),
            runtime: runtime.map(String::from),
            asset_kind: asset_kind.into(),
        });
        self
    }
}
