//! Session-wide registry of resolved packages.
//!
//! Every publish resolution in a build session records the packages it walked
//! here. The orchestrator reads the full list once at the end with
//! [`ResolvedPackageRegistry::seal`]; after that, any further registration is a
//! caller ordering bug and fails with [`Error::RegistrySealed`].

use crate::{Error, Result};
use depship_graph::PackageIdentity;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct RegistryState {
    packages: HashSet<PackageIdentity>,
    sealed: bool,
}

/// Append-only, thread-safe set of resolved package identities with a one-shot seal.
///
/// The set and the sealed flag share one lock, so an `add` racing with
/// `seal` either lands in the snapshot or fails.
#[derive(Debug, Default)]
pub struct ResolvedPackageRegistry {
    state: Mutex<RegistryState>,
}

impl ResolvedPackageRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `package`. Returns `true` if it was not yet known.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegistrySealed`] if the registry has been sealed.
    pub fn add(&self, package: PackageIdentity) -> Result<bool> {
        let mut state = self.state.lock();
        if state.sealed {
            return Err(Error::registry_sealed(package.to_string()));
        }
        trace!(package = %package, "Recording resolved package");
        Ok(state.packages.insert(package))
    }

    /// Whether [`seal`](Self::seal) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Whether `package` has been recorded. Does not seal.
    #[must_use]
    pub fn contains(&self, package: &PackageIdentity) -> bool {
        self.state.lock().packages.contains(package)
    }

    /// Number of distinct packages recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().packages.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seal the registry and return every recorded package, sorted.
    ///
    /// Sealing is idempotent; later calls return the same list.
    pub fn seal(&self) -> ResolvedPackageList {
        let mut state = self.state.lock();
        if !state.sealed {
            state.sealed = true;
            debug!(packages = state.packages.len(), "Sealed resolved package registry");
        }
        let mut packages: Vec<_> = state.packages.iter().cloned().collect();
        packages.sort();
        ResolvedPackageList { packages }
    }

    /// Clear the registry for a new build session.
    pub fn reset(&mut self) {
        let state = self.state.get_mut();
        state.packages.clear();
        state.sealed = false;
    }
}

/// The sealed registry contents, sorted by name then version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedPackageList {
    packages: Vec<PackageIdentity>,
}

impl ResolvedPackageList {
    /// Iterate over the packages.
    pub fn iter(&self) -> impl Iterator<Item = &PackageIdentity> {
        self.packages.iter()
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if no package was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Whether `package` was resolved.
    #[must_use]
    pub fn contains(&self, package: &PackageIdentity) -> bool {
        self.packages.binary_search(package).is_ok()
    }

    /// The packages as a sorted vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<PackageIdentity> {
        self.packages
    }
}

impl IntoIterator for ResolvedPackageList {
    type Item = PackageIdentity;
    type IntoIter = std::vec::IntoIter<PackageIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResolvedPackageList {
    type Item = &'a PackageIdentity;
    type IntoIter = std::slice::Iter<'a, PackageIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates_by_identity() {
        let registry = ResolvedPackageRegistry::new();
        assert!(registry.add(PackageIdentity::new("A", "1.0")).unwrap());
        assert!(!registry.add(PackageIdentity::new("a", "1.0.0")).unwrap());
        assert!(registry.add(PackageIdentity::new("A", "2.0")).unwrap());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_seal_returns_sorted_snapshot() {
        let registry = ResolvedPackageRegistry::new();
        for (name, version) in [("b", "1.0"), ("A", "2.0"), ("a", "1.0")] {
            registry.add(PackageIdentity::new(name, version)).unwrap();
        }

        let list = registry.seal();
        let rendered: Vec<_> = list.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a@1.0", "A@2.0", "b@1.0"]);
        assert!(list.contains(&PackageIdentity::new("B", "1.0")));
    }

    #[test]
    fn test_add_after_seal_fails() {
        let registry = ResolvedPackageRegistry::new();
        registry.add(PackageIdentity::new("A", "1.0")).unwrap();
        assert!(!registry.is_sealed());

        let _ = registry.seal();
        assert!(registry.is_sealed());

        let error = registry.add(PackageIdentity::new("B", "1.0")).unwrap_err();
        assert!(matches!(error, Error::RegistrySealed { ref package } if package == "B@1.0"));
        assert!(!registry.contains(&PackageIdentity::new("B", "1.0")));
    }

    #[test]
    fn test_seal_is_idempotent() {
        let registry = ResolvedPackageRegistry::new();
        registry.add(PackageIdentity::new("A", "1.0")).unwrap();

        assert_eq!(registry.seal(), registry.seal());
    }

    #[test]
    fn test_reads_before_seal_never_fail() {
        let registry = ResolvedPackageRegistry::new();
        registry.add(PackageIdentity::new("A", "1.0")).unwrap();
        assert!(registry.contains(&PackageIdentity::new("A", "1.0")));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_sealed());
        registry.add(PackageIdentity::new("B", "1.0")).unwrap();
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut registry = ResolvedPackageRegistry::new();
        registry.add(PackageIdentity::new("A", "1.0")).unwrap();
        let _ = registry.seal();

        registry.reset();
        assert!(!registry.is_sealed());
        assert!(registry.is_empty());
        registry.add(PackageIdentity::new("B", "1.0")).unwrap();
    }

    #[test]
    fn test_list_serializes_as_array() {
        let registry = ResolvedPackageRegistry::new();
        registry.add(PackageIdentity::new("A", "1.0")).unwrap();

        let json = serde_json::to_value(registry.seal()).unwrap();
        assert_eq!(json, serde_json::json!([{ "name": "A", "version": "1.0" }]));
    }
}
