//! Resolved file records and asset path helpers.

use depship_graph::PackageIdentity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

/// File name NuGet-style packages use to mark an intentionally empty asset group.
pub const PLACEHOLDER_FILE_NAME: &str = "_._";

/// Returns true if `path` is a placeholder marker rather than real content.
#[must_use]
pub fn is_placeholder(path: &str) -> bool {
    path.rsplit(['/', '\\'])
        .next()
        .is_some_and(|name| name == PLACEHOLDER_FILE_NAME)
}

/// Kind of asset a resolved file came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetKind {
    /// Managed runtime assembly.
    Runtime,
    /// Native library.
    Native,
    /// Localized resource assembly.
    Resources,
    /// No specific kind.
    None,
    /// Any other tag, stored lowercased.
    Other(String),
}

impl AssetKind {
    /// Parse a free-form tag, ignoring case.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "runtime" => Self::Runtime,
            "native" => Self::Native,
            "resources" => Self::Resources,
            "" | "none" => Self::None,
            other => Self::Other(other.to_string()),
        }
    }

    /// The lowercase tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Runtime => "runtime",
            Self::Native => "native",
            Self::Resources => "resources",
            Self::None => "none",
            Self::Other(tag) => tag,
        }
    }

    /// Whether runtime-target assets of this kind are published.
    #[must_use]
    pub fn is_publishable_runtime_target(&self) -> bool {
        matches!(self, Self::Runtime | Self::Native)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AssetKind {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<AssetKind> for String {
    fn from(kind: AssetKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A file that must ship with the published application.
///
/// Two records are equal when they share source path and destination
/// subdirectory. The asset kind is metadata only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    source_path: PathBuf,
    destination_subdirectory: PathBuf,
    asset_kind: AssetKind,
}

impl ResolvedFile {
    /// Create a record. The source path is normalized lexically; an empty or
    /// absent subdirectory means the file lands at the publish root.
    #[must_use]
    pub fn new(
        source_path: impl AsRef<Path>,
        destination_subdirectory: Option<PathBuf>,
        asset_kind: AssetKind,
    ) -> Self {
        Self {
            source_path: normalize_path(source_path.as_ref()),
            destination_subdirectory: destination_subdirectory.unwrap_or_default(),
            asset_kind,
        }
    }

    /// Absolute path of the file inside its package.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Subdirectory under the publish root; empty for a flat layout.
    #[must_use]
    pub fn destination_subdirectory(&self) -> &Path {
        &self.destination_subdirectory
    }

    /// Kind of asset the file came from.
    #[must_use]
    pub fn asset_kind(&self) -> &AssetKind {
        &self.asset_kind
    }

    /// File name of the source path.
    #[must_use]
    pub fn file_name(&self) -> &Path {
        self.source_path
            .file_name()
            .map_or_else(|| Path::new(""), Path::new)
    }

    /// Path relative to the publish root.
    #[must_use]
    pub fn destination_subpath(&self) -> PathBuf {
        if self.destination_subdirectory.as_os_str().is_empty() {
            self.file_name().to_path_buf()
        } else {
            self.destination_subdirectory.join(self.file_name())
        }
    }
}

impl PartialEq for ResolvedFile {
    fn eq(&self, other: &Self) -> bool {
        self.source_path == other.source_path
            && self.destination_subdirectory == other.destination_subdirectory
    }
}

impl Eq for ResolvedFile {}

impl Hash for ResolvedFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source_path.hash(state);
        self.destination_subdirectory.hash(state);
    }
}

/// A resolved file tagged with the package that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageFile {
    /// The file itself.
    pub file: ResolvedFile,
    /// Identity of the producing package.
    pub package: PackageIdentity,
}

impl PackageFile {
    /// Tag `file` with `package`.
    #[must_use]
    pub fn new(file: ResolvedFile, package: PackageIdentity) -> Self {
        Self { file, package }
    }
}

/// Lexically normalize a path: drop `.` and resolve `..` without touching disk.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root.
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
