//! Project context: one resolved target selected out of an assets document.
//!
//! The graph provider hands over an [`AssetsDocument`] that may contain many
//! (framework, runtime) sections. A [`ProjectContext`] picks one, builds its
//! [`DependencyGraph`] and computes the exclusion set of libraries already
//! supplied by the platform or by a filter document.

use crate::{Error, Result};
use depship_graph::{
    DependencyGraph, ExclusionSet, GraphNode, NameSet, closure_of, intersect,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// A target framework, by full name and short folder name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFramework {
    /// Full framework name, e.g. `.NETCoreApp,Version=v1.0`.
    pub name: String,
    /// Short folder name, e.g. `netcoreapp1.0`.
    pub short_name: String,
}

impl TargetFramework {
    /// Create a framework descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
        }
    }

    /// Frameworks match when either their full or short names match, ignoring case.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
            || self.short_name.eq_ignore_ascii_case(&other.short_name)
    }
}

/// Libraries resolved for one (framework, runtime) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSection {
    /// Target framework of this section.
    pub framework: TargetFramework,
    /// Runtime identifier; absent for the portable section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    /// Resolved libraries.
    #[serde(default)]
    pub libraries: Vec<GraphNode>,
}

/// Already-parsed assets document supplied by the graph provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsDocument {
    /// Where the document came from; used in error messages.
    pub path: PathBuf,
    /// Every restored target section.
    #[serde(default)]
    pub targets: Vec<TargetSection>,
    /// Package folders, user folder first then fallbacks.
    #[serde(default)]
    pub package_folders: Vec<PathBuf>,
}

impl AssetsDocument {
    /// Find the section for `framework` and `runtime`.
    ///
    /// An absent or empty runtime only matches a section without one.
    #[must_use]
    pub fn target(&self, framework: &TargetFramework, runtime: Option<&str>) -> Option<&TargetSection> {
        let runtime = non_empty(runtime);
        self.targets.iter().find(|section| {
            section.framework.matches(framework) && non_empty(section.runtime.as_deref()) == runtime
        })
    }
}

/// Which target to select and how the app is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    /// Target framework to select.
    pub framework: TargetFramework,
    /// Runtime identifier to select.
    #[serde(default)]
    pub runtime: Option<String>,
    /// Name of the platform library supplying the shared runtime.
    #[serde(default)]
    pub platform_library: Option<String>,
    /// Self-contained apps carry their own runtime; nothing is excluded for the platform.
    #[serde(default)]
    pub is_self_contained: bool,
}

impl ContextRequest {
    /// Request the portable section of `framework`.
    #[must_use]
    pub fn new(framework: TargetFramework) -> Self {
        Self {
            framework,
            runtime: None,
            platform_library: None,
            is_self_contained: false,
        }
    }

    /// Select a runtime identifier.
    #[must_use]
    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    /// Name the platform library.
    #[must_use]
    pub fn with_platform_library(mut self, name: impl Into<String>) -> Self {
        self.platform_library = Some(name.into());
        self
    }

    /// Mark the app as self-contained.
    #[must_use]
    pub fn self_contained(mut self, is_self_contained: bool) -> Self {
        self.is_self_contained = is_self_contained;
        self
    }

    /// `framework` or `framework/runtime`.
    #[must_use]
    pub fn target_moniker(&self) -> String {
        match non_empty(self.runtime.as_deref()) {
            Some(runtime) => format!("{}/{}", self.framework.name, runtime),
            None => self.framework.name.clone(),
        }
    }
}

/// The resolved graph for one target plus what is already supplied.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    framework: TargetFramework,
    runtime: Option<String>,
    graph: DependencyGraph,
    platform_library: Option<String>,
    is_framework_dependent: bool,
    exclusion: ExclusionSet,
}

impl ProjectContext {
    /// Select the requested target from `document` and compute its exclusion set.
    ///
    /// When a `filter` document is given, libraries it resolves to the same
    /// version are excluded as well.
    ///
    /// # Errors
    ///
    /// - [`Error::TargetNotFound`] if `document` has no matching section
    /// - [`Error::FilterTargetNotFound`] if `filter` has no matching section
    /// - [`Error::Graph`] if the platform closure hits a missing dependency
    pub fn create(
        document: &AssetsDocument,
        request: &ContextRequest,
        filter: Option<&AssetsDocument>,
    ) -> Result<Self> {
        let runtime = non_empty(request.runtime.as_deref());

        let section = document
            .target(&request.framework, runtime)
            .ok_or_else(|| Error::TargetNotFound {
                path: document.path.clone(),
                target_moniker: request.target_moniker(),
                framework_short_name: request.framework.short_name.clone(),
                runtime: runtime.map(String::from),
            })?;

        let filter_section = filter
            .map(|filter| {
                filter
                    .target(&request.framework, runtime)
                    .ok_or_else(|| Error::FilterTargetNotFound {
                        path: filter.path.clone(),
                        target_moniker: request.target_moniker(),
                        framework_short_name: request.framework.short_name.clone(),
                        runtime: runtime.map(String::from),
                    })
            })
            .transpose()?;

        let graph = DependencyGraph::from_nodes(section.libraries.iter().cloned());

        let platform_library = non_empty(request.platform_library.as_deref())
            .and_then(|name| graph.node(name))
            .map(|node| node.name().to_string());
        let is_framework_dependent = platform_library.is_some() && !request.is_self_contained;

        let mut exclusion = ExclusionSet::new();
        if is_framework_dependent && let Some(platform) = &platform_library {
            exclusion.extend_from(&closure_of(&graph, platform)?);
        }
        if let Some(filter_section) = filter_section {
            let filter_graph = DependencyGraph::from_nodes(filter_section.libraries.iter().cloned());
            let common = intersect(&graph, &filter_graph);
            debug!(common = common.len(), "Excluding libraries shared with filter document");
            exclusion.extend_from(&common);
        }

        info!(
            target = %request.target_moniker(),
            libraries = graph.len(),
            excluded = exclusion.len(),
            framework_dependent = is_framework_dependent,
            "Created project context"
        );

        Ok(Self {
            framework: section.framework.clone(),
            runtime: runtime.map(String::from),
            graph,
            platform_library,
            is_framework_dependent,
            exclusion,
        })
    }

    /// The selected target framework.
    #[must_use]
    pub fn framework(&self) -> &TargetFramework {
        &self.framework
    }

    /// The selected runtime identifier, if any.
    #[must_use]
    pub fn runtime(&self) -> Option<&str> {
        self.runtime.as_deref()
    }

    /// The graph of the selected section.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// The platform library node, if one was requested and found.
    #[must_use]
    pub fn platform_library(&self) -> Option<&GraphNode> {
        self.platform_library
            .as_deref()
            .and_then(|name| self.graph.node(name))
    }

    /// True when a platform library supplies part of the graph at runtime.
    #[must_use]
    pub fn is_framework_dependent(&self) -> bool {
        self.is_framework_dependent
    }

    /// Names already supplied by the platform or the filter document.
    #[must_use]
    pub fn exclusion_set(&self) -> &ExclusionSet {
        &self.exclusion
    }

    /// Look up a library by name.
    #[must_use]
    pub fn library(&self, name: &str) -> Option<&GraphNode> {
        self.graph.node(name)
    }

    /// Libraries that ship with the app: everything not excluded and not a private asset.
    pub fn runtime_libraries<'a, 'p>(
        &'a self,
        private_assets: &'p NameSet,
    ) -> impl Iterator<Item = &'a GraphNode> + use<'a, 'p> {
        self.graph
            .nodes_excluding(&self.exclusion)
            .filter(move |node| !private_assets.contains(node.name()))
    }

    /// Closure of the library named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Graph`] if the graph is inconsistent below `name`.
    pub fn transitive_list(&self, name: &str) -> Result<NameSet> {
        Ok(closure_of(&self.graph, name)?)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
