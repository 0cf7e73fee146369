//! Project configuration relevant to import resolution.

use std::path::PathBuf;

#[cfg(feature = "config")]
use serde::Deserialize;

/// The `solidity:` section of a project config.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SolidityConfig {
    /// Remap entries as `key=value` strings, e.g. `@vendor=vendor/1.2.0`.
    pub import_remapping: Vec<String>,
    /// Named dependencies, possibly pointing at an external project on disk.
    #[cfg_attr(feature = "config", serde(skip))]
    pub dependencies: Vec<DependencyConfig>,
}

/// A configured dependency.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Deserialize))]
pub struct DependencyConfig {
    pub name: String,
    #[cfg_attr(feature = "config", serde(default))]
    pub version: Option<String>,
    /// Local project path, for dependencies that live outside the cache.
    #[cfg_attr(feature = "config", serde(default))]
    pub project: Option<PathBuf>,
}

impl SolidityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a remap entry.
    pub fn with_remapping(mut self, entry: impl Into<String>) -> Self {
        self.import_remapping.push(entry.into());
        self
    }

    /// Add a configured dependency.
    pub fn with_dependency(mut self, dependency: DependencyConfig) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Find a configured dependency by name.
    pub fn dependency(&self, name: &str) -> Option<&DependencyConfig> {
        self.dependencies.iter().find(|d| d.name == name)
    }
}

#[cfg(feature = "config")]
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    solidity: SolidityConfig,
    dependencies: Vec<DependencyConfig>,
}

#[cfg(feature = "config")]
impl SolidityConfig {
    /// Parse the `solidity:` and `dependencies:` sections of a YAML project config.
    ///
    /// Unknown sections are ignored.
    pub fn from_yaml_str(text: &str) -> crate::Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(text)?;
        let mut config = file.solidity;
        config.dependencies = file.dependencies;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SolidityConfig::new()
            .with_remapping("@vendor=vendor/1.0.0")
            .with_dependency(DependencyConfig {
                name: "vendor".into(),
                version: Some("1.0.0".into()),
                project: None,
            });

        assert_eq!(config.import_remapping, vec!["@vendor=vendor/1.0.0"]);
        assert!(config.dependency("vendor").is_some());
        assert!(config.dependency("other").is_none());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
name: demo
dependencies:
  - name: vendor
    version: 1.2.0
  - name: local
    project: ../local
solidity:
  import_remapping:
    - "@vendor=vendor/1.2.0"
"#;
        let config = SolidityConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.import_remapping, vec!["@vendor=vendor/1.2.0"]);
        assert_eq!(config.dependencies.len(), 2);
        assert_eq!(
            config.dependency("local").and_then(|d| d.project.clone()),
            Some(PathBuf::from("../local"))
        );
    }
}
