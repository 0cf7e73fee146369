use std::fs;

use rustc_hash::FxHashMap;

use super::{RemapEntry, RemappingTable};
use crate::error::{Error, Result};
use crate::project::{Dependency, DependencyManager, Project};

/// Build the remapping table of a project.
///
/// Configured entries come first. An entry whose value names an installed
/// dependency (`name/version`, or a bare `name` with exactly one installed
/// version) has that dependency unpacked into the cache and the configured
/// key pointed at it; anything else passes through as a literal. Then every
/// declared dependency is unpacked and registered under `@name` and `name`
/// unless a configured key already claims it or the key is taken.
pub fn build_remapping(
    project: &Project,
    dependencies: &dyn DependencyManager,
) -> Result<RemappingTable> {
    let declared = dependencies.install()?;
    let installed = dependencies.installed();

    let cache_dir = project.cache_folder();
    fs::create_dir_all(&cache_dir).map_err(|e| Error::io(&cache_dir, e))?;

    let mut builder = TableBuilder {
        project,
        table: RemappingTable::new(),
        key_map: FxHashMap::default(),
    };

    for raw in &project.config().import_remapping {
        let entry = RemapEntry::parse(raw)?;
        let target = match entry.dependency_target(&installed, false)? {
            Some((name, version)) => dependencies.get(&name, &version),
            None => None,
        };

        let Some(dependency) = target else {
            if installed.iter().filter(|d| d.name() == entry.value).count() > 1 {
                tracing::warn!(
                    entry = %entry,
                    "remapping names a dependency installed at several versions; keeping it as a literal"
                );
            }
            builder.table.insert(entry.key, entry.value);
            continue;
        };

        builder
            .key_map
            .insert(dependency.name().to_string(), entry.key.clone());
        builder.unpack(&dependency)?;
    }

    for dependency in &declared {
        builder.unpack(dependency)?;
    }

    tracing::debug!(
        project = %project.display_root(),
        entries = builder.table.len(),
        "built import remapping"
    );
    Ok(builder.table)
}

struct TableBuilder<'a> {
    project: &'a Project,
    table: RemappingTable,
    /// Dependency name → configured key claiming it.
    key_map: FxHashMap<String, String>,
}

impl TableBuilder<'_> {
    fn unpack(&mut self, dependency: &Dependency) -> Result<()> {
        for package in dependency.unpack(&self.project.cache_folder())? {
            let value = self.project.cache_id(&package.name, &package.version);
            match self.key_map.get(package.name.as_str()) {
                Some(key) => {
                    self.table.insert_if_absent(key, &value);
                }
                None => {
                    self.table
                        .insert_if_absent(&format!("@{}", package.name), &value);
                    self.table.insert_if_absent(&package.name, &value);
                }
            }
        }
        Ok(())
    }
}

/// Build the remapping table used for imports inside a dependency's own sources.
///
/// The dependency's configured entries and its own dependencies all point into
/// the root project's cache, where the root unpacked the whole tree.
pub fn build_dependency_remapping(
    project: &Project,
    dependency: &Dependency,
) -> Result<RemappingTable> {
    let mut table = RemappingTable::new();
    let mut claimed: FxHashMap<String, String> = FxHashMap::default();

    for raw in &dependency.config().import_remapping {
        let entry = RemapEntry::parse(raw)?;
        match entry.dependency_target(dependency.dependencies(), false)? {
            Some((name, version)) => {
                table.insert(entry.key.clone(), project.cache_id(&name, &version));
                claimed.insert(name, entry.key);
            }
            None => table.insert(entry.key, entry.value),
        }
    }

    for sub in dependency.dependencies() {
        if claimed.contains_key(sub.name()) {
            continue;
        }
        let value = project.cache_id(sub.name(), sub.version());
        table.insert_if_absent(&format!("@{}", sub.name()), &value);
        table.insert_if_absent(sub.name(), &value);
    }

    Ok(table)
}
