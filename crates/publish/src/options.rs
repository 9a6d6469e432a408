//! Configuration for publish resolution.
//!
//! Option structs are plain serde types so an orchestrator can load them from
//! whatever configuration format it already uses.

use depship_graph::NameSet;
use serde::{Deserialize, Serialize};

/// Options for a single [`PublishResolver`](crate::PublishResolver) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishOptions {
    /// Compile-only packages that never produce publish output.
    pub private_asset_package_ids: NameSet,

    /// Mirror each package's position under its shared root instead of
    /// flattening everything into the publish directory.
    pub preserve_source_layout: bool,

    /// Record every resolved package in the session registry.
    pub track_resolved_packages: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            private_asset_package_ids: NameSet::new(),
            preserve_source_layout: false,
            track_resolved_packages: true,
        }
    }
}

impl PublishOptions {
    /// Set the private-asset package ids.
    #[must_use]
    pub fn with_private_assets<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.private_asset_package_ids = ids.into_iter().collect();
        self
    }

    /// Enable or disable layout preservation.
    #[must_use]
    pub fn with_preserve_source_layout(mut self, preserve: bool) -> Self {
        self.preserve_source_layout = preserve;
        self
    }

    /// Enable or disable registry tracking.
    #[must_use]
    pub fn with_package_tracking(mut self, track: bool) -> Self {
        self.track_resolved_packages = track;
        self
    }
}
