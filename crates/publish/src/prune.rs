//! Package-prune filter.
//!
//! Given seed package ids (packages already present in a target store, for
//! instance), everything in their union closure is dropped from the publish
//! output. The filter is pure and performs no I/O.

use crate::Result;
use crate::asset::{PackageFile, ResolvedFile};
use depship_graph::{DependencyGraph, NameSet, PackageIdentity, union_closure};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Result of [`prune_files`]: a partition of the input files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Files kept for publishing, in input order.
    pub published: Vec<PackageFile>,
    /// Files dropped because their package is in the prune closure, in input order.
    pub pruned: Vec<PackageFile>,
    /// Distinct producing packages of the published files, in first-seen order.
    pub published_packages: Vec<PackageIdentity>,
}

impl PruneOutcome {
    /// The published files without their package tags.
    pub fn published_files(&self) -> impl Iterator<Item = &ResolvedFile> {
        self.published.iter().map(|tagged| &tagged.file)
    }

    /// Distinct producing packages of the pruned files, in first-seen order.
    #[must_use]
    pub fn pruned_packages(&self) -> Vec<PackageIdentity> {
        distinct(self.pruned.iter().map(|tagged| &tagged.package))
    }
}

/// Partition `files` by whether their producing package is in the union
/// closure of `seeds` over `graph`.
///
/// Matching is by package name; published packages are deduplicated by full
/// identity, so two versions of one package stay distinct. Empty seeds are
/// ignored.
///
/// # Errors
///
/// Returns [`Error::Graph`](crate::Error::Graph) if a seed's closure reaches a
/// dependency missing from `graph`.
pub fn prune_files<'a>(
    files: impl IntoIterator<Item = PackageFile>,
    seeds: impl IntoIterator<Item = &'a str>,
    graph: &DependencyGraph,
) -> Result<PruneOutcome> {
    let closure = union_closure(graph, seeds)?;
    debug!(closure = closure.len(), "Computed prune closure");
    Ok(partition(files, &closure))
}

/// Partition `files` against an already computed closure.
#[must_use]
pub fn partition(files: impl IntoIterator<Item = PackageFile>, closure: &NameSet) -> PruneOutcome {
    let (pruned, published): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|tagged| closure.contains(&tagged.package.name));

    for tagged in &pruned {
        trace!(
            package = %tagged.package,
            file = %tagged.file.source_path().display(),
            "Pruned file"
        );
    }

    let published_packages = distinct(published.iter().map(|tagged| &tagged.package));
    debug!(
        published = published.len(),
        pruned = pruned.len(),
        packages = published_packages.len(),
        "Filtered resolved files"
    );

    PruneOutcome {
        published,
        pruned,
        published_packages,
    }
}

fn distinct<'a>(packages: impl Iterator<Item = &'a PackageIdentity>) -> Vec<PackageIdentity> {
    let mut seen = HashSet::new();
    packages
        .filter(|package| seen.insert(*package))
        .cloned()
        .collect()
}
