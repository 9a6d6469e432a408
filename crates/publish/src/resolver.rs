//! Publish resolver: every file a published app must carry.
//!
//! The resolver walks the package nodes of a graph that are neither excluded
//! nor private assets, asks a [`PackageLocator`] where each one is installed
//! and emits one [`ResolvedFile`] per non-placeholder asset.

use crate::asset::{AssetKind, PackageFile, ResolvedFile, is_placeholder, normalize_path};
use crate::context::ProjectContext;
use crate::locator::{PackageLocation, PackageLocator};
use crate::options::PublishOptions;
use crate::registry::ResolvedPackageRegistry;
use crate::{Error, Result};
use depship_graph::{DependencyGraph, ExclusionSet, GraphNode, NodeKind};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Resolves publish output using a package locator.
#[derive(Debug, Clone)]
pub struct PublishResolver<L> {
    locator: L,
}

impl<L: PackageLocator> PublishResolver<L> {
    /// Create a resolver backed by `locator`.
    #[must_use]
    pub fn new(locator: L) -> Self {
        Self { locator }
    }

    /// The package locator.
    #[must_use]
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Resolve every publishable file of `graph`, skipping `excluded` names.
    ///
    /// When `options.track_resolved_packages` is set, each walked package is
    /// recorded in `registry`.
    ///
    /// # Errors
    ///
    /// - [`Error::RegistrySealed`] if tracking is on and `registry` is sealed
    /// - [`Error::PackageRootMismatch`] if a file lies outside its package root
    pub fn resolve(
        &self,
        graph: &DependencyGraph,
        excluded: &ExclusionSet,
        options: &PublishOptions,
        registry: &ResolvedPackageRegistry,
    ) -> Result<Vec<ResolvedFile>> {
        Ok(self
            .resolve_tagged(graph, excluded, options, registry)?
            .into_iter()
            .map(|tagged| tagged.file)
            .collect())
    }

    /// Like [`resolve`](Self::resolve), but every file keeps the identity of
    /// the package that produced it.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_tagged(
        &self,
        graph: &DependencyGraph,
        excluded: &ExclusionSet,
        options: &PublishOptions,
        registry: &ResolvedPackageRegistry,
    ) -> Result<Vec<PackageFile>> {
        let mut files = Vec::new();

        let packages = graph
            .nodes_excluding(excluded)
            .filter(|node| node.kind == NodeKind::Package)
            .filter(|node| !options.private_asset_package_ids.contains(node.name()));

        for node in packages {
            if options.track_resolved_packages {
                registry.add(node.identity.clone())?;
            }

            let Some(location) = self.locator.locate(&node.identity) else {
                warn!(package = %node.identity, "Package has no install location; no files resolved");
                continue;
            };

            let before = files.len();
            collect_node_files(node, &location, options.preserve_source_layout, &mut files)?;
            debug!(
                package = %node.identity,
                files = files.len() - before,
                "Resolved package files"
            );
        }

        Ok(files)
    }

    /// Resolve the runtime libraries of a project context.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_context(
        &self,
        context: &ProjectContext,
        options: &PublishOptions,
        registry: &ResolvedPackageRegistry,
    ) -> Result<Vec<ResolvedFile>> {
        self.resolve(context.graph(), context.exclusion_set(), options, registry)
    }
}

/// Where files of one package land.
struct Layout<'a> {
    install_path: &'a Path,
    package_root: Option<&'a Path>,
    preserve: bool,
}

impl Layout<'_> {
    /// Destination subdirectory for `source`.
    ///
    /// With layout preservation and a known root this is the source's parent
    /// relative to the root; otherwise the asset's own subdirectory, if any.
    fn destination(&self, source: &Path, natural: Option<PathBuf>) -> Result<Option<PathBuf>> {
        match self.package_root {
            Some(root) if self.preserve => {
                let relative = source
                    .strip_prefix(root)
                    .map_err(|_| Error::package_root_mismatch(root, source))?;
                Ok(relative.parent().map(Path::to_path_buf))
            }
            _ => Ok(natural),
        }
    }

    fn file(&self, asset_path: &str, natural: Option<PathBuf>, kind: AssetKind) -> Result<ResolvedFile> {
        let source = normalize_path(&self.install_path.join(asset_path));
        let destination = self.destination(&source, natural)?;
        Ok(ResolvedFile::new(source, destination, kind))
    }
}

fn collect_node_files(
    node: &GraphNode,
    location: &PackageLocation,
    preserve: bool,
    out: &mut Vec<PackageFile>,
) -> Result<()> {
    let layout = Layout {
        install_path: &location.install_path,
        package_root: location.package_root.as_deref(),
        preserve,
    };
    let mut push = |file: ResolvedFile| out.push(PackageFile::new(file, node.identity.clone()));

    for path in real_assets(node, node.runtime_assemblies.iter().map(String::as_str)) {
        push(layout.file(path, None, AssetKind::Runtime)?);
    }

    for path in real_assets(node, node.native_libraries.iter().map(String::as_str)) {
        push(layout.file(path, None, AssetKind::Native)?);
    }

    for asset in &node.runtime_targets {
        let kind = AssetKind::parse(&asset.asset_kind);
        if !kind.is_publishable_runtime_target() || skip_placeholder(node, &asset.path) {
            continue;
        }
        let natural = asset
            .runtime
            .as_deref()
            .filter(|runtime| !runtime.is_empty())
            .and_then(|_| Path::new(&asset.path).parent())
            .map(Path::to_path_buf);
        push(layout.file(&asset.path, natural, kind)?);
    }

    for asset in &node.resource_assemblies {
        if skip_placeholder(node, &asset.path) {
            continue;
        }
        let natural = asset
            .locale
            .as_deref()
            .filter(|locale| !locale.is_empty())
            .map(PathBuf::from);
        push(layout.file(&asset.path, natural, AssetKind::Resources)?);
    }

    Ok(())
}

fn real_assets<'a>(
    node: &'a GraphNode,
    paths: impl Iterator<Item = &'a str> + 'a,
) -> impl Iterator<Item = &'a str> + 'a {
    paths.filter(move |path| !skip_placeholder(node, path))
}

fn skip_placeholder(node: &GraphNode, path: &str) -> bool {
    let placeholder = is_placeholder(path);
    if placeholder {
        trace!(package = %node.identity, path, "Skipping placeholder asset");
    }
    placeholder
}

#[cfg(test)]
mod tests {
    use super::*;
    use depship_graph::{NameSet, PackageIdentity};
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct MapLocator {
        locations: HashMap<String, PackageLocation>,
    }

    impl MapLocator {
        fn with(mut self, name: &str, location: PackageLocation) -> Self {
            self.locations.insert(name.to_ascii_lowercase(), location);
            self
        }
    }

    impl PackageLocator for MapLocator {
        fn locate(&self, package: &PackageIdentity) -> Option<PackageLocation> {
            self.locations.get(&package.name.to_ascii_lowercase()).cloned()
        }
    }

    fn rooted(name: &str) -> PackageLocation {
        PackageLocation::new(format!("/packages/{name}/1.0"), "/packages")
    }

    fn rich_package() -> GraphNode {
        GraphNode::package("Rich", "1.0")
            .with_runtime_assembly("lib/netstandard1.0/Rich.dll")
            .with_runtime_assembly("lib/netstandard1.0/_._")
            .with_native_library("runtimes/linux-x64/native/librich.so")
            .with_runtime_target("runtimes/win/lib/netstandard1.0/Rich.dll", Some("win"), "runtime")
            .with_runtime_target("runtimes/unix/lib/netstandard1.0/Rich.Unix.dll", None, "RUNTIME")
            .with_runtime_target("runtimes/win/lib/netstandard1.0/Rich.xml", Some("win"), "documentation")
            .with_runtime_target("runtimes/osx/lib/_._", Some("osx"), "runtime")
            .with_resource_assembly("lib/netstandard1.0/fr/Rich.resources.dll", Some("fr"))
            .with_resource_assembly("lib/netstandard1.0/Rich.resources.dll", None)
    }

    fn resolve(
        graph: &DependencyGraph,
        locator: MapLocator,
        options: &PublishOptions,
    ) -> Result<Vec<ResolvedFile>> {
        PublishResolver::new(locator).resolve(
            graph,
            &ExclusionSet::new(),
            options,
            &ResolvedPackageRegistry::new(),
        )
    }

    fn destinations(files: &[ResolvedFile]) -> Vec<(String, String, String)> {
        files
            .iter()
            .map(|file| {
                (
                    file.source_path().display().to_string(),
                    file.destination_subdirectory().display().to_string(),
                    file.asset_kind().to_string(),
                )
            })
            .collect()
    }

    fn row(source: &str, destination: &str, kind: &str) -> (String, String, String) {
        (source.to_string(), destination.to_string(), kind.to_string())
    }

    #[test]
    fn test_flat_layout() {
        let graph = DependencyGraph::from_nodes([rich_package()]);
        let locator = MapLocator::default().with("Rich", rooted("rich"));

        let files = resolve(&graph, locator, &PublishOptions::default()).unwrap();
        assert_eq!(
            destinations(&files),
            vec![
                row("/packages/rich/1.0/lib/netstandard1.0/Rich.dll", "", "runtime"),
                row("/packages/rich/1.0/runtimes/linux-x64/native/librich.so", "", "native"),
                row(
                    "/packages/rich/1.0/runtimes/win/lib/netstandard1.0/Rich.dll",
                    "runtimes/win/lib/netstandard1.0",
                    "runtime",
                ),
                row("/packages/rich/1.0/runtimes/unix/lib/netstandard1.0/Rich.Unix.dll", "", "runtime"),
                row("/packages/rich/1.0/lib/netstandard1.0/fr/Rich.resources.dll", "fr", "resources"),
                row("/packages/rich/1.0/lib/netstandard1.0/Rich.resources.dll", "", "resources"),
            ]
        );
    }

    #[test]
    fn test_placeholders_never_resolve() {
        let graph = DependencyGraph::from_nodes([rich_package()]);
        let locator = MapLocator::default().with("Rich", rooted("rich"));

        let files = resolve(&graph, locator, &PublishOptions::default()).unwrap();
        assert!(files.iter().all(|file| file.file_name() != Path::new("_._")));
    }

    #[test]
    fn test_placeholder_only_package_yields_nothing() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::package("Facade", "1.0").with_runtime_assembly("lib/net45/_._"),
        ]);
        let locator = MapLocator::default().with("Facade", rooted("facade"));

        let files = resolve(&graph, locator, &PublishOptions::default()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_repeated_resolution_is_a_set_union() {
        let graph = DependencyGraph::from_nodes([GraphNode::package("A", "1.0")
            .with_runtime_assembly("lib/a.dll")
            .with_native_library("lib/a.dll")]);
        let resolver = PublishResolver::new(MapLocator::default().with("A", rooted("a")));
        let registry = ResolvedPackageRegistry::new();
        let options = PublishOptions::default();

        let once: HashSet<ResolvedFile> = resolver
            .resolve(&graph, &ExclusionSet::new(), &options, &registry)
            .unwrap()
            .into_iter()
            .collect();
        let mut twice = once.clone();
        twice.extend(
            resolver
                .resolve(&graph, &ExclusionSet::new(), &options, &registry)
                .unwrap(),
        );

        assert_eq!(once.len(), 1);
        assert_eq!(twice, once);
        assert_eq!(registry.seal().into_vec(), vec![PackageIdentity::new("A", "1.0")]);
    }

    #[test]
    fn test_preserve_layout_mirrors_package_root() {
        let graph = DependencyGraph::from_nodes([rich_package()]);
        let locator = MapLocator::default().with("Rich", rooted("rich"));
        let options = PublishOptions::default().with_preserve_source_layout(true);

        let files = resolve(&graph, locator, &options).unwrap();
        assert_eq!(
            files[0].destination_subdirectory(),
            Path::new("rich/1.0/lib/netstandard1.0")
        );
        assert_eq!(
            files[4].destination_subdirectory(),
            Path::new("rich/1.0/lib/netstandard1.0/fr")
        );
    }

    #[test]
    fn test_preserve_layout_without_root_stays_flat() {
        let graph = DependencyGraph::from_nodes([rich_package()]);
        let locator = MapLocator::default().with("Rich", PackageLocation::unrooted("/opt/rich"));
        let options = PublishOptions::default().with_preserve_source_layout(true);

        let files = resolve(&graph, locator, &options).unwrap();
        assert_eq!(files[0].destination_subdirectory(), Path::new(""));
        assert_eq!(files[4].destination_subdirectory(), Path::new("fr"));
    }

    #[test]
    fn test_install_path_outside_root_is_an_error() {
        let graph = DependencyGraph::from_nodes([rich_package()]);
        let locator =
            MapLocator::default().with("Rich", PackageLocation::new("/elsewhere/rich/1.0", "/packages"));
        let options = PublishOptions::default().with_preserve_source_layout(true);

        let error = resolve(&graph, locator, &options).unwrap_err();
        assert!(matches!(error, Error::PackageRootMismatch { .. }));
    }

    #[test]
    fn test_root_prefix_is_component_wise() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::package("A", "1.0").with_runtime_assembly("lib/a.dll"),
        ]);
        let locator =
            MapLocator::default().with("A", PackageLocation::new("/packages-extra/a/1.0", "/packages"));
        let options = PublishOptions::default().with_preserve_source_layout(true);

        assert!(resolve(&graph, locator, &options).is_err());
    }

    #[test]
    fn test_only_package_nodes_resolve() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::project("App", "1.0").with_runtime_assembly("App.dll"),
            GraphNode::platform("Platform", "1.0").with_runtime_assembly("lib/Platform.dll"),
            GraphNode::package("Lib", "1.0").with_runtime_assembly("lib/Lib.dll"),
        ]);
        let locator = MapLocator::default()
            .with("App", rooted("app"))
            .with("Platform", rooted("platform"))
            .with("Lib", rooted("lib"));

        let files = resolve(&graph, locator, &PublishOptions::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), Path::new("Lib.dll"));
    }

    #[test]
    fn test_excluded_and_private_packages_are_skipped() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::package("Shared", "2.0").with_runtime_assembly("lib/Shared.dll"),
            GraphNode::package("Analyzer", "1.0").with_runtime_assembly("lib/Analyzer.dll"),
            GraphNode::package("AppLib", "1.0").with_runtime_assembly("lib/AppLib.dll"),
        ]);
        let locator = MapLocator::default()
            .with("Shared", rooted("shared"))
            .with("Analyzer", rooted("analyzer"))
            .with("AppLib", rooted("applib"));
        let excluded: ExclusionSet = ["shared"].into_iter().collect();
        let options = PublishOptions::default().with_private_assets(["ANALYZER"]);
        let registry = ResolvedPackageRegistry::new();

        let files = PublishResolver::new(locator)
            .resolve(&graph, &excluded, &options, &registry)
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), Path::new("AppLib.dll"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&PackageIdentity::new("AppLib", "1.0")));
    }

    #[test]
    fn test_unlocated_package_is_tracked_but_contributes_nothing() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::package("Ghost", "1.0").with_runtime_assembly("lib/Ghost.dll"),
        ]);
        let registry = ResolvedPackageRegistry::new();

        let files = PublishResolver::new(MapLocator::default())
            .resolve(&graph, &ExclusionSet::new(), &PublishOptions::default(), &registry)
            .unwrap();
        assert!(files.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sealed_registry_rejects_resolution() {
        let graph = DependencyGraph::from_nodes([GraphNode::package("A", "1.0")]);
        let registry = ResolvedPackageRegistry::new();
        let _ = registry.seal();

        let error = PublishResolver::new(MapLocator::default())
            .resolve(&graph, &ExclusionSet::new(), &PublishOptions::default(), &registry)
            .unwrap_err();
        assert!(matches!(error, Error::RegistrySealed { .. }));
    }

    #[test]
    fn test_untracked_resolution_ignores_registry() {
        let graph = DependencyGraph::from_nodes([GraphNode::package("A", "1.0")]);
        let registry = ResolvedPackageRegistry::new();
        let _ = registry.seal();
        let options = PublishOptions::default().with_package_tracking(false);

        let files = PublishResolver::new(MapLocator::default())
            .resolve(&graph, &ExclusionSet::new(), &options, &registry)
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_tagged_files_carry_producing_package() {
        let graph = DependencyGraph::from_nodes([
            GraphNode::package("A", "1.0").with_runtime_assembly("lib/a.dll"),
            GraphNode::package("B", "2.0").with_runtime_assembly("lib/b.dll"),
        ]);
        let locator = MapLocator::default().with("A", rooted("a")).with("B", rooted("b"));

        let tagged = PublishResolver::new(locator)
            .resolve_tagged(
                &graph,
                &NameSet::new(),
                &PublishOptions::default(),
                &ResolvedPackageRegistry::new(),
            )
            .unwrap();
        let packages: Vec<_> = tagged.iter().map(|file| file.package.to_string()).collect();
        assert_eq!(packages, vec!["A@1.0", "B@2.0"]);
    }
}
