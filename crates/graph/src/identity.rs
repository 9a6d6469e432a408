//! Package identity primitives.
//!
//! A [`PackageIdentity`] pins a package name to an exact [`PackageVersion`].
//! Names compare case-insensitively; versions compare by their normalized form
//! so that `1.0`, `1.0.0` and `1.0.0.0` are the same version. There is no
//! range or precedence logic here: every comparison is exact equality against
//! an already-resolved version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An exact, already-resolved package version.
///
/// The original text is kept for display. Equality and hashing use the
/// normalized form: numeric components with trailing zeros dropped, a
/// lowercased pre-release label, and no build metadata. Strings that are not
/// dotted numbers fall back to case-insensitive text comparison.
///
/// The [`Ord`] implementation only exists for deterministic output ordering;
/// it is not version precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PackageVersion {
    text: String,
    key: VersionKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum VersionKey {
    Numeric {
        parts: Vec<u64>,
        release: Option<String>,
    },
    Opaque(String),
}

impl PackageVersion {
    /// Parse a version string. Never fails; unrecognized text is kept opaque.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.to_string(),
            key: normalize(text.trim()),
        }
    }

    /// The version as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Canonical lowercase rendering: at least three numeric components, no
    /// build metadata. Package folders are named this way.
    ///
    /// `1.0` and `1.0.0.0` both render as `1.0.0`; `2.0.0-Beta+sha` renders as
    /// `2.0.0-beta`. Opaque versions render as their lowercased text.
    #[must_use]
    pub fn normalized(&self) -> String {
        match &self.key {
            VersionKey::Numeric { parts, release } => {
                let mut numbers: Vec<String> = parts.iter().map(u64::to_string).collect();
                while numbers.len() < 3 {
                    numbers.push("0".to_string());
                }
                let mut rendered = numbers.join(".");
                if let Some(release) = release {
                    rendered.push('-');
                    rendered.push_str(release);
                }
                rendered
            }
            VersionKey::Opaque(text) => text.clone(),
        }
    }
}

fn normalize(text: &str) -> VersionKey {
    let without_metadata = text.split_once('+').map_or(text, |(head, _)| head);
    let (numbers, release) = match without_metadata.split_once('-') {
        Some((numbers, release)) => (numbers, Some(release.to_ascii_lowercase())),
        None => (without_metadata, None),
    };

    let parts: Option<Vec<u64>> = numbers
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect();

    match parts {
        Some(mut parts) if !numbers.is_empty() => {
            while parts.len() > 1 && parts.last() == Some(&0) {
                parts.pop();
            }
            VersionKey::Numeric { parts, release }
        }
        _ => VersionKey::Opaque(text.to_ascii_lowercase()),
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<String> for PackageVersion {
    fn from(text: String) -> Self {
        let key = normalize(text.trim());
        Self { text, key }
    }
}

impl From<&str> for PackageVersion {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<PackageVersion> for String {
    fn from(version: PackageVersion) -> Self {
        version.text
    }
}

/// A package name pinned to an exact version.
///
/// Equality and hashing are structural over both fields and case-insensitive
/// on the name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageIdentity {
    /// Package id as written by the graph provider.
    pub name: String,
    /// Exact resolved version.
    pub version: PackageVersion,
}

impl PackageIdentity {
    /// Create a new identity.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<PackageVersion>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Returns true if `name` refers to this package, ignoring case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.has_name(&other.name) && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.name.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_usize(self.name.len());
        self.version.hash(state);
    }
}

impl PartialOrd for PackageIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        name_key(&self.name)
            .cmp(&name_key(&other.name))
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Normalized lookup key for a package name.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// A case-insensitive set of package names.
///
/// Used for closures, exclusion sets and graph intersections. The first
/// spelling inserted for a name is the one reported by [`NameSet::iter`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NameSet {
    names: BTreeMap<String, String>,
}

/// Names considered already supplied by a baseline and therefore skipped.
pub type ExclusionSet = NameSet;

impl NameSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name. Returns `true` if it was not already present.
    pub fn insert(&mut self, name: &str) -> bool {
        let key = name_key(name);
        if self.names.contains_key(&key) {
            return false;
        }
        self.names.insert(key, name.to_string());
        true
    }

    /// Returns true if the set contains `name`, ignoring case.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name_key(name))
    }

    /// Add every name from `other`.
    pub fn extend_from(&mut self, other: &Self) {
        for name in other.iter() {
            self.insert(name);
        }
    }

    /// Number of names in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate names in case-insensitive sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }
}

impl PartialEq for NameSet {
    fn eq(&self, other: &Self) -> bool {
        self.names.len() == other.names.len() && self.names.keys().eq(other.names.keys())
    }
}

impl Eq for NameSet {}

impl<S: AsRef<str>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for NameSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<NameSet> for Vec<String> {
    fn from(set: NameSet) -> Self {
        set.names.into_values().collect()
    }
}
