//! Runtime dependency manifest.
//!
//! [`build`] merges the project description in a [`ManifestConfig`] with the
//! runtime libraries of a [`ProjectContext`] into one [`DependencyManifest`].
//! Writing the manifest out is left to the caller; every type here is serde
//! serializable.

use crate::Result;
use crate::context::ProjectContext;
use depship_graph::{GraphNode, NameSet, PackageIdentity, union_closure};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A localized satellite assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatelliteAssembly {
    /// Culture name, e.g. `fr-FR`.
    pub locale: String,
    /// Path of the satellite assembly.
    pub path: PathBuf,
}

impl SatelliteAssembly {
    /// Create a satellite assembly record.
    #[must_use]
    pub fn new(locale: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            locale: locale.into(),
            path: path.into(),
        }
    }
}

/// Identity and output of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Assembly name.
    pub name: String,
    /// Assembly version.
    pub version: String,
    /// Project file path.
    pub path: PathBuf,
    /// Output extension including the dot, e.g. `.dll`.
    pub extension: String,
    /// Localized outputs.
    #[serde(default)]
    pub satellite_assemblies: Vec<SatelliteAssembly>,
}

impl ProjectInfo {
    /// Create a project record without satellites.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            extension: extension.into(),
            satellite_assemblies: Vec::new(),
        }
    }

    /// Add a satellite assembly.
    #[must_use]
    pub fn with_satellite(mut self, satellite: SatelliteAssembly) -> Self {
        self.satellite_assemblies.push(satellite);
        self
    }

    /// File name of the project output.
    #[must_use]
    pub fn output_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }
}

/// An assembly referenced by path rather than through the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceInfo {
    /// Assembly name.
    pub name: String,
    /// Assembly version.
    pub version: String,
    /// Path of the referenced assembly.
    pub path: PathBuf,
    /// Localized outputs of the reference.
    #[serde(default)]
    pub satellite_assemblies: Vec<SatelliteAssembly>,
}

impl ReferenceInfo {
    /// Create a reference named after the file stem of `path`.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            version: version.into(),
            path,
            satellite_assemblies: Vec::new(),
        }
    }

    /// Add a satellite assembly.
    #[must_use]
    pub fn with_satellite(mut self, satellite: SatelliteAssembly) -> Self {
        self.satellite_assemblies.push(satellite);
        self
    }

    /// File name of the referenced assembly.
    #[must_use]
    pub fn file_name(&self) -> &Path {
        self.path
            .file_name()
            .map_or_else(|| Path::new(""), Path::new)
    }
}

/// Compiler settings, carried through opaquely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationOptions {
    /// Language version, e.g. `7.3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,
    /// Preprocessor symbols.
    pub defines: Vec<String>,
    /// Nullable context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<String>,
    /// Debug symbol type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_type: Option<String>,
    /// Whether optimizations are on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    /// Target platform, e.g. `x64`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Whether unsafe code is allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unsafe: Option<bool>,
    /// Whether warnings fail the build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings_as_errors: Option<bool>,
}

/// A named list of packages that are supplied elsewhere, e.g. by a package store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSource {
    /// Name of the source, usually its file name.
    pub name: String,
    /// Packages listed by the source.
    #[serde(default)]
    pub packages: Vec<PackageIdentity>,
}

impl FilterSource {
    /// Create a filter source.
    #[must_use]
    pub fn new(name: impl Into<String>, packages: impl IntoIterator<Item = PackageIdentity>) -> Self {
        Self {
            name: name.into(),
            packages: packages.into_iter().collect(),
        }
    }
}

/// Everything [`build`] needs besides the project context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig {
    /// The main project.
    pub project: ProjectInfo,
    /// Reference assemblies supplied by the platform.
    #[serde(default)]
    pub framework_references: Vec<ReferenceInfo>,
    /// Assemblies referenced directly by path.
    #[serde(default)]
    pub direct_references: Vec<ReferenceInfo>,
    /// Project-to-project references.
    #[serde(default)]
    pub project_references: Vec<ProjectInfo>,
    /// Compile-only package ids, kept out of the runtime libraries.
    #[serde(default)]
    pub private_assets: NameSet,
    /// Compiler settings.
    #[serde(default)]
    pub compilation_options: CompilationOptions,
    /// Root of the installed reference assemblies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_assemblies_path: Option<PathBuf>,
    /// Package lists whose packages are excluded from the manifest.
    #[serde(default)]
    pub filter_sources: Vec<FilterSource>,
}

impl ManifestConfig {
    /// A config for `project` with every other input empty.
    #[must_use]
    pub fn new(project: ProjectInfo) -> Self {
        Self {
            project,
            framework_references: Vec::new(),
            direct_references: Vec::new(),
            project_references: Vec::new(),
            private_assets: NameSet::new(),
            compilation_options: CompilationOptions::default(),
            reference_assemblies_path: None,
            filter_sources: Vec::new(),
        }
    }
}

/// The runtime the manifest targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeTarget {
    /// Full target framework name.
    pub framework: String,
    /// Runtime identifier; absent for portable apps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Platform library supplying the shared runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_library: Option<PackageIdentity>,
    /// True when the platform library is not shipped with the app.
    pub is_framework_dependent: bool,
}

impl RuntimeTarget {
    /// `framework` or `framework/runtime`.
    #[must_use]
    pub fn name(&self) -> String {
        match &self.runtime {
            Some(runtime) => format!("{}/{}", self.framework, runtime),
            None => self.framework.clone(),
        }
    }
}

/// A package left out of the manifest and the filter sources that listed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrunedPackage {
    /// The excluded package.
    pub package: PackageIdentity,
    /// Names of the filter sources listing the package, in encounter order.
    pub filter_sources: Vec<String>,
}

impl PrunedPackage {
    /// Filter source names joined for display.
    #[must_use]
    pub fn label(&self) -> String {
        self.filter_sources.join(", ")
    }
}

/// The runtime dependency manifest of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyManifest {
    /// Framework, runtime and platform of the app.
    pub runtime_target: RuntimeTarget,
    /// The main project.
    pub project: ProjectInfo,
    /// Runtime libraries, in graph order.
    pub libraries: Vec<GraphNode>,
    /// Reference assemblies supplied by the platform.
    pub framework_references: Vec<ReferenceInfo>,
    /// Direct references; each is a leaf outside the graph.
    pub references: Vec<ReferenceInfo>,
    /// Project-to-project references.
    pub project_references: Vec<ProjectInfo>,
    /// Compiler settings.
    pub compilation_options: CompilationOptions,
    /// Root of the installed reference assemblies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_assemblies_path: Option<PathBuf>,
    /// Packages excluded by filter sources, in first-seen order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pruned_packages: Vec<PrunedPackage>,
}

impl DependencyManifest {
    /// Look up a runtime library by name.
    #[must_use]
    pub fn library(&self, name: &str) -> Option<&GraphNode> {
        self.libraries.iter().find(|node| node.identity.has_name(name))
    }

    /// The filter sources that excluded `package`, if any.
    #[must_use]
    pub fn pruned_by(&self, package: &PackageIdentity) -> Option<&PrunedPackage> {
        self.pruned_packages
            .iter()
            .find(|pruned| &pruned.package == package)
    }
}

/// Build the manifest for `context` described by `config`.
///
/// A package listed by a filter source at its resolved identity seeds a
/// closure over the context graph; every library in that closure is left out
/// of `libraries` and recorded in `pruned_packages`.
///
/// # Errors
///
/// Returns [`crate::Error::Graph`] if a filter closure hits a missing
/// dependency.
pub fn build(config: &ManifestConfig, context: &ProjectContext) -> Result<DependencyManifest> {
    let (pruned_names, pruned_packages) = collect_pruned(&config.filter_sources, context)?;

    let libraries: Vec<GraphNode> = context
        .runtime_libraries(&config.private_assets)
        .filter(|node| !pruned_names.contains(node.name()))
        .cloned()
        .collect();

    let runtime_target = RuntimeTarget {
        framework: context.framework().name.clone(),
        runtime: context.runtime().map(String::from),
        platform_library: context.platform_library().map(|node| node.identity.clone()),
        is_framework_dependent: context.is_framework_dependent(),
    };

    debug!(
        target = %runtime_target.name(),
        libraries = libraries.len(),
        pruned = pruned_packages.len(),
        "Built dependency manifest"
    );

    Ok(DependencyManifest {
        runtime_target,
        project: config.project.clone(),
        libraries,
        framework_references: config.framework_references.clone(),
        references: config.direct_references.clone(),
        project_references: config.project_references.clone(),
        compilation_options: config.compilation_options.clone(),
        reference_assemblies_path: config.reference_assemblies_path.clone(),
        pruned_packages,
    })
}

/// Names excluded by the filter sources, and each excluded package with the
/// sources excluding it.
///
/// Every source contributes its listed packages plus the closure of those
/// listed at their resolved identity. A package excluded by several sources
/// gets every name appended, once per source.
fn collect_pruned(
    sources: &[FilterSource],
    context: &ProjectContext,
) -> Result<(NameSet, Vec<PrunedPackage>)> {
    let graph = context.graph();
    let mut names = NameSet::new();
    let mut pruned: Vec<PrunedPackage> = Vec::new();
    let mut index: HashMap<PackageIdentity, usize> = HashMap::new();

    for source in sources {
        let seeds = source.packages.iter().filter(|package| {
            graph
                .node(&package.name)
                .is_some_and(|node| node.identity == **package)
        });
        let closure = union_closure(graph, seeds.map(|package| package.name.as_str()))?;
        names.extend_from(&closure);

        let members = source.packages.iter().cloned().chain(
            graph
                .nodes()
                .filter(|node| closure.contains(node.name()))
                .map(|node| node.identity.clone()),
        );

        let mut seen: HashSet<PackageIdentity> = HashSet::new();
        for package in members {
            if !seen.insert(package.clone()) {
                continue;
            }
            match index.get(&package) {
                Some(&slot) => pruned[slot].filter_sources.push(source.name.clone()),
                None => {
                    debug!(package = %package, source = %source.name, "Filter source excludes package");
                    index.insert(package.clone(), pruned.len());
                    pruned.push(PrunedPackage {
                        package,
                        filter_sources: vec![source.name.clone()],
                    });
                }
            }
        }
    }

    Ok((names, pruned))
}
