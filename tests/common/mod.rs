//! Shared fixtures: project trees on disk and in-memory collaborators.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use semver::Version;
use solgraph::project::StaticDependencies;
use solgraph::{Dependency, DependencyManager, Error, Result, Toolchain};

pub fn write(root: &Path, rel: &str, text: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, text).unwrap();
    path
}

pub fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

/// A toolchain with fixed version lists that records installs.
#[derive(Default)]
pub struct FakeToolchain {
    pub installed: Vec<Version>,
    /// `None` simulates being offline.
    pub available: Option<Vec<Version>>,
    pub installs: Mutex<Vec<Version>>,
}

impl FakeToolchain {
    pub fn installed(versions: &[&str]) -> Self {
        Self {
            installed: versions.iter().map(|s| v(s)).collect(),
            available: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_available(mut self, versions: &[&str]) -> Self {
        self.available = Some(versions.iter().map(|s| v(s)).collect());
        self
    }

    pub fn install_count(&self) -> usize {
        self.installs.lock().len()
    }
}

impl Toolchain for FakeToolchain {
    fn installed_versions(&self) -> Result<BTreeSet<Version>> {
        Ok(self.installed.iter().cloned().collect())
    }

    fn available_versions(&self) -> Result<BTreeSet<Version>> {
        self.available
            .as_ref()
            .map(|versions| versions.iter().cloned().collect())
            .ok_or_else(|| Error::Toolchain("no network".into()))
    }

    fn install(&self, version: &Version) -> Result<()> {
        self.installs.lock().push(version.clone());
        Ok(())
    }
}

/// Wraps [`StaticDependencies`] and counts `install` calls.
pub struct CountingDependencies {
    inner: StaticDependencies,
    pub installs: Mutex<usize>,
}

impl CountingDependencies {
    pub fn new(declared: Vec<Dependency>) -> Self {
        Self {
            inner: StaticDependencies::new(declared),
            installs: Mutex::new(0),
        }
    }

    pub fn install_count(&self) -> usize {
        *self.installs.lock()
    }
}

impl DependencyManager for CountingDependencies {
    fn install(&self) -> Result<Vec<Dependency>> {
        *self.installs.lock() += 1;
        self.inner.install()
    }

    fn installed(&self) -> Vec<Dependency> {
        self.inner.installed()
    }

    fn get(&self, name: &str, version: &str) -> Option<Dependency> {
        self.inner.get(name, version)
    }
}
