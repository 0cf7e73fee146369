//! Compiler version selection and the version map.
//!
//! [`VersionSelector`] picks the best compiler for one file from its pragma,
//! installing on demand. [`compute_version_map`] combines those picks with
//! the import graph so that an importer is never compiled at a version its
//! imports cannot share, and [`consolidate`] makes every source land in a
//! single group.

mod map;
mod select;

use std::collections::BTreeSet;

use semver::{BuildMetadata, Version};

use crate::error::Result;

pub use map::{VersionMap, compute_version_map, consolidate};
pub use select::{Selection, VersionSelector, select_version_for};

/// The compiler toolchain: what is installed locally, what can be installed.
pub trait Toolchain {
    fn installed_versions(&self) -> Result<BTreeSet<Version>>;

    /// Versions offered for installation. May need network access.
    fn available_versions(&self) -> Result<BTreeSet<Version>>;

    fn install(&self, version: &Version) -> Result<()>;
}

/// Drop build metadata: `0.8.21+commit.d9974bed` becomes `0.8.21`.
pub fn strip_build(version: &Version) -> Version {
    Version {
        build: BuildMetadata::EMPTY,
        ..version.clone()
    }
}
