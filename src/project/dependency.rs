//! Installed dependencies and the manager that provides them.

use std::fs;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use walkdir::WalkDir;

use super::config::SolidityConfig;
use crate::base::to_slash;
use crate::error::{Error, Result};

/// An installed, versioned dependency project.
///
/// Dependencies form a tree: each one carries its own configuration and
/// its own dependencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    name: SmolStr,
    version: SmolStr,
    /// Root of the installed project.
    path: PathBuf,
    /// Source folder relative to `path`.
    contracts_folder: PathBuf,
    config: SolidityConfig,
    dependencies: Vec<Dependency>,
}

/// A dependency that was materialized into the cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpackedDependency {
    pub name: SmolStr,
    pub version: SmolStr,
    /// Files written by this unpack (empty when the cache was already populated).
    pub files: Vec<PathBuf>,
}

impl Dependency {
    /// Create a dependency installed at `path` with sources in `path/contracts`.
    pub fn new(
        name: impl Into<SmolStr>,
        version: impl Into<SmolStr>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            contracts_folder: PathBuf::from("contracts"),
            config: SolidityConfig::default(),
            dependencies: Vec::new(),
        }
    }

    /// Set the source folder (relative to the installed root).
    pub fn with_contracts_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.contracts_folder = folder.into();
        self
    }

    /// Set the dependency's own configuration.
    pub fn with_config(mut self, config: SolidityConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a dependency of this dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &SolidityConfig {
        &self.config
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// The source folder name as a slash path, e.g. `contracts` or `src`.
    pub fn contracts_folder_name(&self) -> String {
        to_slash(&self.contracts_folder)
    }

    /// Id of this dependency's cache folder: `{name}/{version}`.
    pub fn cache_id(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }

    /// Copy this dependency's sources, and those of its own dependencies, into `cache_dir`.
    ///
    /// Sources land at `{cache_dir}/{name}/{version}/{contracts_folder}/...`.
    /// Packages whose cache folder already holds files are left untouched.
    pub fn unpack(&self, cache_dir: &Path) -> Result<Vec<UnpackedDependency>> {
        let mut unpacked = Vec::new();
        self.unpack_into(cache_dir, &mut unpacked)?;
        Ok(unpacked)
    }

    fn unpack_into(&self, cache_dir: &Path, out: &mut Vec<UnpackedDependency>) -> Result<()> {
        // Diamond dependency trees reach the same package more than once.
        if out
            .iter()
            .any(|u| u.name == self.name && u.version == self.version)
        {
            return Ok(());
        }

        let package_dir = cache_dir.join(self.name.as_str()).join(self.version.as_str());
        let files = if has_files(&package_dir) {
            tracing::trace!(dependency = %self.cache_id(), "already unpacked");
            Vec::new()
        } else {
            let source_dir = self.path.join(&self.contracts_folder);
            let dest_dir = package_dir.join(&self.contracts_folder);
            match copy_sources(&source_dir, &dest_dir) {
                Ok(files) => files,
                Err(err) => {
                    // A partial copy would pass for a finished one next time.
                    discard(&package_dir);
                    return Err(err);
                }
            }
        };
        fs::create_dir_all(&package_dir).map_err(|e| Error::io(&package_dir, e))?;

        out.push(UnpackedDependency {
            name: self.name.clone(),
            version: self.version.clone(),
            files,
        });

        for dependency in &self.dependencies {
            dependency.unpack_into(cache_dir, out)?;
        }
        Ok(())
    }

    /// Search this dependency and its subtree.
    fn find(&self, name: &str, version: &str) -> Option<&Dependency> {
        if self.name == name && self.version == version {
            return Some(self);
        }
        self.dependencies.iter().find_map(|d| d.find(name, version))
    }
}

fn has_files(dir: &Path) -> bool {
    dir.is_dir()
        && WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .any(|e| e.file_type().is_file())
}

fn discard(package_dir: &Path) {
    if !package_dir.exists() {
        return;
    }
    if let Err(err) = fs::remove_dir_all(package_dir) {
        tracing::warn!(
            path = %package_dir.display(),
            error = %err,
            "failed to remove partially unpacked dependency"
        );
    }
}

fn copy_sources(source_dir: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !source_dir.is_dir() {
        tracing::warn!(path = %source_dir.display(), "dependency has no source folder");
        return Ok(written);
    }

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            Error::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path());
        let dest = dest_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(entry.path(), &dest).map_err(|e| Error::io(entry.path(), e))?;
        written.push(dest);
    }
    Ok(written)
}

/// Provides the installed dependency tree of a project.
///
/// Fetching and installing packages happens behind this trait.
pub trait DependencyManager {
    /// Install (if needed) and return every dependency the project declares.
    fn install(&self) -> Result<Vec<Dependency>>;

    /// Every dependency present locally, declared or not.
    fn installed(&self) -> Vec<Dependency>;

    /// Look up a dependency by name and version anywhere in the tree.
    fn get(&self, name: &str, version: &str) -> Option<Dependency>;
}

/// A [`DependencyManager`] over an already-installed, in-memory dependency list.
#[derive(Clone, Debug, Default)]
pub struct StaticDependencies {
    declared: Vec<Dependency>,
    /// Installed but not declared by the project.
    extra: Vec<Dependency>,
}

impl StaticDependencies {
    pub fn new(declared: Vec<Dependency>) -> Self {
        Self {
            declared,
            extra: Vec::new(),
        }
    }

    /// Register an installed dependency the project does not declare.
    pub fn with_installed(mut self, dependency: Dependency) -> Self {
        self.extra.push(dependency);
        self
    }
}

impl DependencyManager for StaticDependencies {
    fn install(&self) -> Result<Vec<Dependency>> {
        Ok(self.declared.clone())
    }

    fn installed(&self) -> Vec<Dependency> {
        self.declared.iter().chain(&self.extra).cloned().collect()
    }

    fn get(&self, name: &str, version: &str) -> Option<Dependency> {
        self.declared
            .iter()
            .chain(&self.extra)
            .find_map(|d| d.find(name, version))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_unpack_copies_contracts_folder() {
        let tmp = TempDir::new().unwrap();
        let dep_root = tmp.path().join("installed/vendor");
        write(&dep_root.join("src/token/ERC20.sol"), "contract ERC20 {}");
        write(&dep_root.join("README.md"), "not copied");

        let dep = Dependency::new("vendor", "1.0.0", &dep_root).with_contracts_folder("src");
        let cache = tmp.path().join("cache");
        let unpacked = dep.unpack(&cache).unwrap();

        assert_eq!(unpacked.len(), 1);
        assert_eq!(unpacked[0].files.len(), 1);
        assert!(cache.join("vendor/1.0.0/src/token/ERC20.sol").is_file());
        assert!(!cache.join("vendor/1.0.0/README.md").exists());
    }

    #[test]
    fn test_unpack_includes_nested_dependencies() {
        let tmp = TempDir::new().unwrap();
        let inner_root = tmp.path().join("installed/inner");
        let outer_root = tmp.path().join("installed/outer");
        write(&inner_root.join("contracts/Inner.sol"), "contract Inner {}");
        write(&outer_root.join("contracts/Outer.sol"), "contract Outer {}");

        let inner = Dependency::new("inner", "0.1.0", &inner_root);
        let outer = Dependency::new("outer", "2.0.0", &outer_root).with_dependency(inner);
        let cache = tmp.path().join("cache");

        let names: Vec<_> = outer
            .unpack(&cache)
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["outer", "inner"]);
        assert!(cache.join("inner/0.1.0/contracts/Inner.sol").is_file());
    }

    #[test]
    fn test_unpack_skips_populated_cache() {
        let tmp = TempDir::new().unwrap();
        let dep_root = tmp.path().join("installed/vendor");
        write(&dep_root.join("contracts/A.sol"), "contract A {}");
        let dep = Dependency::new("vendor", "1.0.0", &dep_root);
        let cache = tmp.path().join("cache");

        assert_eq!(dep.unpack(&cache).unwrap()[0].files.len(), 1);
        assert!(dep.unpack(&cache).unwrap()[0].files.is_empty());
    }

    #[test]
    fn test_failed_unpack_leaves_no_partial_package() {
        let tmp = TempDir::new().unwrap();
        let dep_root = tmp.path().join("installed/vendor");
        write(&dep_root.join("contracts/A.sol"), "contract A {}");
        write(&dep_root.join("contracts/B.sol"), "contract B {}");
        let dep = Dependency::new("vendor", "1.0.0", &dep_root);
        let cache = tmp.path().join("cache");

        // A directory in the way of B.sol makes the copy fail after A.sol.
        let blocker = cache.join("vendor/1.0.0/contracts/B.sol");
        fs::create_dir_all(&blocker).unwrap();

        let err = dep.unpack(&cache).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!cache.join("vendor/1.0.0").exists());

        let unpacked = dep.unpack(&cache).unwrap();
        assert_eq!(unpacked[0].files.len(), 2);
        assert!(cache.join("vendor/1.0.0/contracts/A.sol").is_file());
        assert!(cache.join("vendor/1.0.0/contracts/B.sol").is_file());
    }

    #[test]
    fn test_unpack_without_sources_still_creates_package_dir() {
        let tmp = TempDir::new().unwrap();
        let dep = Dependency::new("empty", "0.1.0", tmp.path().join("installed/empty"));
        let cache = tmp.path().join("cache");

        assert!(dep.unpack(&cache).unwrap()[0].files.is_empty());
        assert!(cache.join("empty/0.1.0").is_dir());
    }

    #[test]
    fn test_static_dependencies_lookup() {
        let inner = Dependency::new("inner", "0.1.0", "/deps/inner");
        let outer = Dependency::new("outer", "2.0.0", "/deps/outer").with_dependency(inner);
        let manager = StaticDependencies::new(vec![outer])
            .with_installed(Dependency::new("loose", "1.0.0", "/deps/loose"));

        assert!(manager.get("inner", "0.1.0").is_some());
        assert!(manager.get("inner", "9.9.9").is_none());
        assert_eq!(manager.install().unwrap().len(), 1);
        assert_eq!(manager.installed().len(), 2);
    }
}
