//! Property-based tests for the package-prune filter.
//!
//! These tests verify the behavioral contracts of pruning:
//! - Published and pruned files partition the input
//! - Published packages are distinct and cover every published file
//! - Pruning is idempotent

#![allow(clippy::unwrap_used, clippy::expect_used)]

use depship_graph::{DependencyGraph, GraphNode, PackageIdentity};
use depship_publish::{AssetKind, PackageFile, ResolvedFile, prune_files};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Strategies for generating test data
// =============================================================================

const NAMES: usize = 8;
const VERSIONS: [&str; 3] = ["1.0", "1.0.0", "2.0"];

/// A chain graph Pkg0 <- Pkg1 <- ... where each node depends on its
/// predecessor at either its resolved version or a diverged one.
fn graph_strategy() -> impl Strategy<Value = DependencyGraph> {
    proptest::collection::vec(any::<bool>(), NAMES).prop_map(|pinned| {
        DependencyGraph::from_nodes((0..NAMES).map(|i| {
            let node = GraphNode::package(format!("Pkg{i}"), "1.0");
            if i == 0 {
                node
            } else if pinned[i] {
                node.with_dependency(format!("Pkg{}", i - 1), "1.0")
            } else {
                node.with_dependency(format!("Pkg{}", i - 1), "3.0")
            }
        }))
    })
}

fn files_strategy() -> impl Strategy<Value = Vec<PackageFile>> {
    proptest::collection::vec(
        (0..NAMES, proptest::sample::select(VERSIONS.to_vec()), 0..4_usize),
        0..24,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .map(|(name, version, file)| {
                PackageFile::new(
                    ResolvedFile::new(
                        format!("/packages/pkg{name}/{version}/lib/file{file}.dll"),
                        None,
                        AssetKind::Runtime,
                    ),
                    PackageIdentity::new(format!("Pkg{name}"), version),
                )
            })
            .collect()
    })
}

fn seeds_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            (0..NAMES).prop_map(|i| format!("Pkg{i}")),
            Just(String::new()),
            Just("NotInGraph".to_string()),
        ],
        0..4,
    )
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    /// Contract: published ∪ pruned == input, and the two are disjoint.
    #[test]
    fn prune_partition_is_complete(
        graph in graph_strategy(),
        files in files_strategy(),
        seeds in seeds_strategy(),
    ) {
        let outcome = prune_files(
            files.clone(),
            seeds.iter().map(String::as_str),
            &graph,
        ).unwrap();

        prop_assert_eq!(outcome.published.len() + outcome.pruned.len(), files.len());

        let mut rejoined: Vec<_> = outcome.published.iter().chain(&outcome.pruned).cloned().collect();
        let mut expected = files;
        let key = |tagged: &PackageFile| {
            (tagged.file.source_path().to_path_buf(), tagged.package.to_string())
        };
        rejoined.sort_by_key(key);
        expected.sort_by_key(key);
        prop_assert_eq!(rejoined, expected);

        let published_names: HashSet<_> = outcome
            .published
            .iter()
            .map(|tagged| tagged.package.name.to_ascii_lowercase())
            .collect();
        for tagged in &outcome.pruned {
            prop_assert!(!published_names.contains(&tagged.package.name.to_ascii_lowercase()));
        }
    }

    /// Contract: published packages are distinct and match the published files.
    #[test]
    fn published_packages_are_distinct(
        graph in graph_strategy(),
        files in files_strategy(),
        seeds in seeds_strategy(),
    ) {
        let outcome = prune_files(files, seeds.iter().map(String::as_str), &graph).unwrap();

        let distinct: HashSet<_> = outcome.published_packages.iter().collect();
        prop_assert_eq!(distinct.len(), outcome.published_packages.len());

        let from_files: HashSet<_> = outcome.published.iter().map(|tagged| &tagged.package).collect();
        prop_assert_eq!(distinct, from_files);
    }

    /// Contract: pruning the published output again changes nothing.
    #[test]
    fn prune_is_idempotent(
        graph in graph_strategy(),
        files in files_strategy(),
        seeds in seeds_strategy(),
    ) {
        let first = prune_files(files, seeds.iter().map(String::as_str), &graph).unwrap();
        let second = prune_files(
            first.published.clone(),
            seeds.iter().map(String::as_str),
            &graph,
        ).unwrap();

        prop_assert!(second.pruned.is_empty());
        prop_assert_eq!(second.published, first.published);
        prop_assert_eq!(second.published_packages, first.published_packages);
    }
}
