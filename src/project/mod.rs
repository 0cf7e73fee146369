//! Project layout, configuration and dependencies.
//!
//! A [`Project`] knows where its sources live, where unpacked dependencies
//! are cached, and how to turn filesystem paths into [`SourceId`]s.

mod config;
mod dependency;
mod sources;

use std::path::{Path, PathBuf};

use crate::base::{CACHE_FOLDER, SourceId, cache_location, join_slash, normalize, to_slash};
use crate::error::{Error, Result};

pub use config::{DependencyConfig, SolidityConfig};
pub use dependency::{Dependency, DependencyManager, StaticDependencies, UnpackedDependency};
pub use sources::{SOURCE_EXTENSION, verify_source_paths};

/// The on-disk layout of a project.
#[derive(Clone, Debug)]
pub struct Project {
    /// Canonical project root.
    root: PathBuf,
    /// Absolute contracts root (usually `{root}/contracts`).
    contracts_folder: PathBuf,
    config: SolidityConfig,
}

impl Project {
    /// Open a project rooted at `root` with sources under `root/contracts_folder`.
    ///
    /// The root must exist; it is canonicalized so that every [`SourceId`]
    /// is computed against the same absolute path.
    pub fn new(
        root: impl AsRef<Path>,
        contracts_folder: impl AsRef<Path>,
        config: SolidityConfig,
    ) -> Result<Self> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|e| Error::io(root, e))?;
        let contracts_folder = normalize(&root.join(contracts_folder.as_ref()));
        Ok(Self {
            root,
            contracts_folder,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contracts_folder(&self) -> &Path {
        &self.contracts_folder
    }

    pub fn config(&self) -> &SolidityConfig {
        &self.config
    }

    /// Where dependencies are unpacked: `{contracts}/.cache`.
    pub fn cache_folder(&self) -> PathBuf {
        self.contracts_folder.join(CACHE_FOLDER)
    }

    /// The contracts root relative to the project root (`""` when they coincide).
    pub fn contracts_prefix(&self) -> String {
        SourceId::from_path(&self.contracts_folder, &self.root)
            .as_str()
            .to_string()
    }

    /// Cache path id of a dependency: `{contracts-prefix}/.cache/{name}/{version}`.
    pub fn cache_id(&self, name: &str, version: &str) -> String {
        join_slash(
            &self.contracts_prefix(),
            &format!("{CACHE_FOLDER}/{name}/{version}"),
        )
    }

    /// The [`SourceId`] of a filesystem path.
    pub fn source_id(&self, path: &Path) -> SourceId {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let absolute = absolute
            .canonicalize()
            .unwrap_or_else(|_| normalize(&absolute));
        SourceId::from_path(&absolute, &self.root)
    }

    /// The absolute path of a [`SourceId`].
    pub fn path_of(&self, id: &SourceId) -> PathBuf {
        normalize(&self.root.join(id.as_str()))
    }

    /// The dependency `(name, version)` whose cache folder holds `id`, if any.
    pub fn dependency_of(&self, id: &SourceId) -> Option<(String, String)> {
        cache_location(id.as_str()).map(|loc| (loc.name.to_string(), loc.version.to_string()))
    }

    /// Display helper for log fields.
    pub fn display_root(&self) -> String {
        to_slash(&self.root)
    }
}
