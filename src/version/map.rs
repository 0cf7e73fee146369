use std::collections::{BTreeMap, BTreeSet};

use semver::Version;

use super::VersionSelector;
use crate::base::SourceId;
use crate::error::Result;
use crate::graph::SourceTree;
use crate::pragma::PragmaTable;

/// Sources grouped by the compiler version that builds them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionMap {
    groups: BTreeMap<Version, BTreeSet<SourceId>>,
    /// Each file's own final version, before grouping.
    resolved: BTreeMap<SourceId, Version>,
}

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&Version, &BTreeSet<SourceId>)> {
        self.groups.iter()
    }

    pub fn get(&self, version: &Version) -> Option<&BTreeSet<SourceId>> {
        self.groups.get(version)
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.groups.keys()
    }

    /// The version `id` itself resolved to.
    pub fn resolved_version(&self, id: &SourceId) -> Option<&Version> {
        self.resolved.get(id)
    }

    /// Every group holding `id`.
    pub fn versions_of<'a, 'b>(&'a self, id: &'b SourceId) -> impl Iterator<Item = &'a Version> {
        self.groups
            .iter()
            .filter(move |(_, files)| files.contains(id))
            .map(|(version, _)| version)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn add(&mut self, version: &Version, files: impl IntoIterator<Item = SourceId>) {
        self.groups.entry(version.clone()).or_default().extend(files);
    }
}

impl IntoIterator for VersionMap {
    type Item = (Version, BTreeSet<SourceId>);
    type IntoIter = std::collections::btree_map::IntoIter<Version, BTreeSet<SourceId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group `files` and everything they import by compiler version.
///
/// Each file starts at its own best version. It then walks its transitive
/// imports in order: the first exactly pinned import sets the file's version
/// outright, otherwise any import with a lower best version lowers it. A file
/// that is itself exactly pinned keeps its pin. The file and its imports are
/// grouped under the final version.
pub fn compute_version_map(
    files: &[SourceId],
    tree: &SourceTree,
    pragmas: &PragmaTable,
    selector: &mut VersionSelector<'_>,
) -> Result<VersionMap> {
    let mut closure: BTreeMap<SourceId, BTreeSet<SourceId>> = BTreeMap::new();
    for file in files {
        let imports = tree.transitive_imports(file);
        for import in &imports {
            if !closure.contains_key(import) {
                closure.insert(import.clone(), tree.transitive_imports(import));
            }
        }
        closure.insert(file.clone(), imports);
    }

    let mut best: BTreeMap<SourceId, Version> = BTreeMap::new();
    for file in closure.keys() {
        best.insert(file.clone(), selector.select(file, pragmas)?);
    }

    let mut map = VersionMap::new();
    for (file, imports) in &closure {
        let Some(mut version) = best.get(file).cloned() else {
            continue;
        };
        if !pragmas.is_exact_pin(file) {
            for import in imports {
                let Some(imported) = best.get(import) else {
                    continue;
                };
                if pragmas.is_exact_pin(import) {
                    version = imported.clone();
                    break;
                }
                if *imported < version {
                    version = imported.clone();
                }
            }
        }

        tracing::trace!(source = %file, %version, "resolved compiler version");
        map.add(&version, std::iter::once(file.clone()).chain(imports.iter().cloned()));
        map.resolved.insert(file.clone(), version);
    }

    Ok(map)
}

/// Make every source appear in exactly one group.
///
/// A source in several groups is first dropped from every group, other than
/// the one of its own version, where no other member imports it. A source
/// still shared after that stays only in the group of its own version (or the
/// highest such group) and the duplication is logged. Emptied groups are
/// removed.
pub fn consolidate(mut map: VersionMap, tree: &SourceTree) -> VersionMap {
    let versions: Vec<Version> = map.groups.keys().cloned().collect();

    for version in &versions {
        let Some(group) = map.groups.get(version) else {
            continue;
        };
        let candidates: Vec<SourceId> = group.iter().cloned().collect();
        for file in candidates {
            if map.versions_of(&file).count() < 2 || map.resolved.get(&file) == Some(version) {
                continue;
            }
            let Some(group) = map.groups.get(version) else {
                break;
            };
            let needed = group
                .iter()
                .filter(|other| **other != file)
                .any(|other| tree.transitive_imports(other).contains(&file));
            if !needed {
                tracing::trace!(source = %file, %version, "dropping shared import from group");
                if let Some(group) = map.groups.get_mut(version) {
                    group.remove(&file);
                }
            }
        }
    }

    let shared: BTreeSet<SourceId> = map
        .groups
        .values()
        .flatten()
        .filter(|file| map.versions_of(file).count() > 1)
        .cloned()
        .collect();
    for file in shared {
        let holders: Vec<Version> = map.versions_of(&file).cloned().collect();
        let keep = map
            .resolved
            .get(&file)
            .filter(|own| holders.contains(own))
            .or_else(|| holders.last())
            .cloned();
        let Some(keep) = keep else {
            continue;
        };
        tracing::warn!(
            source = %file,
            version = %keep,
            groups = holders.len(),
            "source is needed under several compiler versions; compiling it once"
        );
        for version in holders.iter().filter(|v| **v != keep) {
            if let Some(group) = map.groups.get_mut(version) {
                group.remove(&file);
            }
        }
    }

    map.groups.retain(|_, files| !files.is_empty());
    map
}
