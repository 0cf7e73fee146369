use std::collections::BTreeSet;

use semver::Version;

use super::{Toolchain, strip_build};
use crate::base::SourceId;
use crate::error::{Error, Result};
use crate::pragma::PragmaTable;

/// The best compiler for a file, and whether it still has to be installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    Installed(Version),
    Install(Version),
}

impl Selection {
    pub fn version(&self) -> &Version {
        match self {
            Selection::Installed(version) | Selection::Install(version) => version,
        }
    }
}

/// Pick the compiler version for `file`.
///
/// With a pragma: the highest installed match, else the highest installable
/// match. Without one: the latest installed, else the latest installable.
pub fn select_version_for(
    file: &SourceId,
    pragmas: &PragmaTable,
    installed: &BTreeSet<Version>,
    available: &BTreeSet<Version>,
) -> Result<Selection> {
    match pragmas.get(file) {
        Some(spec) => {
            if let Some(version) = spec.select(installed) {
                return Ok(Selection::Installed(version));
            }
            spec.select(available)
                .map(Selection::Install)
                .ok_or_else(|| Error::UnsatisfiableVersion {
                    spec: spec.to_string(),
                })
        }
        None => {
            if let Some(version) = installed.last() {
                return Ok(Selection::Installed(version.clone()));
            }
            available
                .last()
                .cloned()
                .map(Selection::Install)
                .ok_or(Error::NoCompilerVersions)
        }
    }
}

/// Selects versions against a [`Toolchain`], installing what is missing.
///
/// The installable list is only fetched when the installed set cannot
/// satisfy a request; failing to fetch it counts as "nothing installable".
pub struct VersionSelector<'a> {
    toolchain: &'a dyn Toolchain,
    installed: BTreeSet<Version>,
    available: BTreeSet<Version>,
    probed: bool,
}

impl<'a> VersionSelector<'a> {
    pub fn new(toolchain: &'a dyn Toolchain) -> Result<Self> {
        let installed = toolchain
            .installed_versions()?
            .iter()
            .map(strip_build)
            .collect();
        Ok(Self {
            toolchain,
            installed,
            available: BTreeSet::new(),
            probed: false,
        })
    }

    /// Installed versions, including those installed by this selector.
    pub fn installed(&self) -> &BTreeSet<Version> {
        &self.installed
    }

    /// The best version for `file`, installing it first if needed.
    pub fn select(&mut self, file: &SourceId, pragmas: &PragmaTable) -> Result<Version> {
        let selection =
            match select_version_for(file, pragmas, &self.installed, &BTreeSet::new()) {
                Ok(selection) => selection,
                Err(_) => {
                    self.probe_available();
                    select_version_for(file, pragmas, &self.installed, &self.available)?
                }
            };

        let version = match selection {
            Selection::Installed(version) => version,
            Selection::Install(version) => {
                tracing::debug!(%version, source = %file, "installing compiler");
                self.toolchain.install(&version)?;
                self.installed.insert(version.clone());
                version
            }
        };
        tracing::trace!(%version, source = %file, "selected compiler");
        Ok(version)
    }

    fn probe_available(&mut self) {
        if self.probed {
            return;
        }
        self.probed = true;
        match self.toolchain.available_versions() {
            Ok(versions) => self.available = versions.iter().map(strip_build).collect(),
            Err(error) => tracing::warn!(
                %error,
                "could not list installable compiler versions; assuming none"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pragma::PragmaSpec;
    use parking_lot::Mutex;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn versions(items: &[&str]) -> BTreeSet<Version> {
        items.iter().map(|s| v(s)).collect()
    }

    #[derive(Default)]
    struct FakeToolchain {
        installed: Vec<&'static str>,
        available: Option<Vec<&'static str>>,
        installs: Mutex<Vec<Version>>,
        probes: Mutex<usize>,
    }

    impl Toolchain for FakeToolchain {
        fn installed_versions(&self) -> Result<BTreeSet<Version>> {
            Ok(versions(&self.installed))
        }

        fn available_versions(&self) -> Result<BTreeSet<Version>> {
            *self.probes.lock() += 1;
            self.available
                .as_deref()
                .map(versions)
                .ok_or_else(|| Error::Toolchain("offline".into()))
        }

        fn install(&self, version: &Version) -> Result<()> {
            self.installs.lock().push(version.clone());
            Ok(())
        }
    }

    fn pragmas(entries: &[(&str, Option<&str>)]) -> PragmaTable {
        entries
            .iter()
            .map(|(id, spec)| (SourceId::new(id), spec.map(|s| PragmaSpec::parse(s).unwrap())))
            .collect()
    }

    #[test]
    fn test_select_maximum_installed_match() {
        let table = pragmas(&[("A.sol", Some(">=0.4.19 <0.7.0"))]);
        let selection = select_version_for(
            &SourceId::new("A.sol"),
            &table,
            &versions(&["0.5.16", "0.6.12", "0.8.12"]),
            &BTreeSet::new(),
        )
        .unwrap();
        assert_eq!(selection, Selection::Installed(v("0.6.12")));
    }

    #[test]
    fn test_select_installable_match() {
        let table = pragmas(&[("A.sol", Some("^0.7.0"))]);
        let selection = select_version_for(
            &SourceId::new("A.sol"),
            &table,
            &versions(&["0.8.12"]),
            &versions(&["0.7.5", "0.7.6", "0.8.26"]),
        )
        .unwrap();
        assert_eq!(selection, Selection::Install(v("0.7.6")));
    }

    #[test]
    fn test_unsatisfiable() {
        let table = pragmas(&[("A.sol", Some("^0.4.0"))]);
        let err = select_version_for(
            &SourceId::new("A.sol"),
            &table,
            &versions(&["0.8.12"]),
            &versions(&["0.8.26"]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsatisfiableVersion { ref spec } if spec == "^0.4.0"));
    }

    #[test]
    fn test_no_versions_anywhere() {
        let err = select_version_for(
            &SourceId::new("A.sol"),
            &PragmaTable::new(),
            &BTreeSet::new(),
            &BTreeSet::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoCompilerVersions));
    }

    #[test]
    fn test_unconstrained_installs_latest_once() {
        let toolchain = FakeToolchain {
            available: Some(vec!["0.8.20", "0.8.26"]),
            ..FakeToolchain::default()
        };
        let table = pragmas(&[("Missing.sol", None)]);
        let mut selector = VersionSelector::new(&toolchain).unwrap();

        let id = SourceId::new("Missing.sol");
        assert_eq!(selector.select(&id, &table).unwrap(), v("0.8.26"));
        assert_eq!(selector.select(&id, &table).unwrap(), v("0.8.26"));

        assert_eq!(*toolchain.installs.lock(), vec![v("0.8.26")]);
        assert!(selector.installed().contains(&v("0.8.26")));
    }

    #[test]
    fn test_installed_match_skips_probe() {
        let toolchain = FakeToolchain {
            installed: vec!["0.8.12+commit.f00d7308"],
            ..FakeToolchain::default()
        };
        let table = pragmas(&[("A.sol", Some("^0.8.0"))]);
        let mut selector = VersionSelector::new(&toolchain).unwrap();

        assert_eq!(
            selector.select(&SourceId::new("A.sol"), &table).unwrap(),
            v("0.8.12")
        );
        assert_eq!(*toolchain.probes.lock(), 0);
    }

    #[test]
    fn test_offline_probe_is_empty() {
        let toolchain = FakeToolchain {
            installed: vec!["0.8.12"],
            available: None,
            ..FakeToolchain::default()
        };
        let table = pragmas(&[("A.sol", Some("^0.7.0"))]);
        let mut selector = VersionSelector::new(&toolchain).unwrap();

        let err = selector.select(&SourceId::new("A.sol"), &table).unwrap_err();
        assert!(matches!(err, Error::UnsatisfiableVersion { .. }));
        assert!(toolchain.installs.lock().is_empty());
    }
}
