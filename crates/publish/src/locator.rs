//! Locating package install directories on disk.

use depship_graph::PackageIdentity;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Where a package is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    /// Directory holding the package contents.
    pub install_path: PathBuf,
    /// Shared root the install directory lives under, if known.
    pub package_root: Option<PathBuf>,
}

impl PackageLocation {
    /// A location with a known shared root.
    #[must_use]
    pub fn new(install_path: impl Into<PathBuf>, package_root: impl Into<PathBuf>) -> Self {
        Self {
            install_path: install_path.into(),
            package_root: Some(package_root.into()),
        }
    }

    /// A location without a shared root.
    #[must_use]
    pub fn unrooted(install_path: impl Into<PathBuf>) -> Self {
        Self {
            install_path: install_path.into(),
            package_root: None,
        }
    }
}

/// Maps a package identity to its install location.
///
/// Returning `None` means the package is not installed; the resolver then
/// contributes no files for it.
pub trait PackageLocator {
    /// Locate `package`.
    fn locate(&self, package: &PackageIdentity) -> Option<PackageLocation>;
}

/// Looks packages up in `<folder>/<id>/<version>` across an ordered list of
/// package folders. Ids are lowercased; the version folder is the normalized
/// version (`1.0` is found under `1.0.0`), falling back to the version as
/// written.
///
/// The first folder is the user package folder; the rest are fallbacks.
#[derive(Debug, Clone, Default)]
pub struct FolderPackageLocator {
    folders: Vec<PathBuf>,
}

impl FolderPackageLocator {
    /// Search `folders` in order.
    #[must_use]
    pub fn new(folders: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            folders: folders.into_iter().map(Into::into).collect(),
        }
    }

    /// The folders searched, in order.
    #[must_use]
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    fn candidates(folder: &Path, package: &PackageIdentity) -> Vec<PathBuf> {
        let id_dir = folder.join(package.name.to_lowercase());
        let normalized = package.version.normalized();
        let written = package.version.as_str().trim().to_lowercase();

        let mut candidates = vec![id_dir.join(&normalized)];
        if written != normalized {
            candidates.push(id_dir.join(written));
        }
        candidates
    }
}

impl PackageLocator for FolderPackageLocator {
    fn locate(&self, package: &PackageIdentity) -> Option<PackageLocation> {
        let found = self.folders.iter().find_map(|folder| {
            Self::candidates(folder, package)
                .into_iter()
                .find(|candidate| candidate.is_dir())
                .map(|candidate| PackageLocation::new(candidate, folder.clone()))
        });
        if found.is_none() {
            trace!(package = %package, "Package not found in any package folder");
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_locates_in_first_matching_folder() {
        let user = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        fs::create_dir_all(fallback.path().join("newtonsoft.json").join("9.0.1")).unwrap();

        let locator = FolderPackageLocator::new([user.path(), fallback.path()]);
        let location = locator
            .locate(&PackageIdentity::new("Newtonsoft.Json", "9.0.1"))
            .unwrap();

        assert_eq!(
            location.install_path,
            fallback.path().join("newtonsoft.json").join("9.0.1")
        );
        assert_eq!(location.package_root.as_deref(), Some(fallback.path()));
    }

    #[test]
    fn test_user_folder_wins() {
        let user = tempfile::tempdir().unwrap();
        let fallback = tempfile::tempdir().unwrap();
        for folder in [user.path(), fallback.path()] {
            fs::create_dir_all(folder.join("a").join("1.0.0-beta")).unwrap();
        }

        let locator = FolderPackageLocator::new([user.path(), fallback.path()]);
        let location = locator.locate(&PackageIdentity::new("A", "1.0.0-Beta")).unwrap();
        assert_eq!(location.package_root.as_deref(), Some(user.path()));
    }

    #[test]
    fn test_short_version_finds_normalized_folder() {
        let user = tempfile::tempdir().unwrap();
        fs::create_dir_all(user.path().join("a").join("1.0.0")).unwrap();

        let locator = FolderPackageLocator::new([user.path()]);
        let location = locator.locate(&PackageIdentity::new("A", "1.0")).unwrap();
        assert_eq!(location.install_path, user.path().join("a").join("1.0.0"));
    }

    #[test]
    fn test_version_as_written_is_a_fallback() {
        let user = tempfile::tempdir().unwrap();
        fs::create_dir_all(user.path().join("a").join("1.0")).unwrap();

        let locator = FolderPackageLocator::new([user.path()]);
        let location = locator.locate(&PackageIdentity::new("A", "1.0")).unwrap();
        assert_eq!(location.install_path, user.path().join("a").join("1.0"));
    }

    #[test]
    fn test_missing_package() {
        let user = tempfile::tempdir().unwrap();
        let locator = FolderPackageLocator::new([user.path()]);
        assert!(locator.locate(&PackageIdentity::new("A", "1.0")).is_none());
    }

    #[test]
    fn test_files_are_not_install_directories() {
        let user = tempfile::tempdir().unwrap();
        fs::create_dir_all(user.path().join("a")).unwrap();
        fs::write(user.path().join("a").join("1.0"), b"").unwrap();

        let locator = FolderPackageLocator::new([user.path()]);
        assert!(locator.locate(&PackageIdentity::new("A", "1.0")).is_none());
    }
}
