use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHasher};

use super::{RemapCorrection, RemappingTable, build_remapping};
use crate::base::cache_location;
use crate::error::Result;
use crate::project::{DependencyManager, Project};

/// Per-project memoization of remapping tables.
///
/// An entry is reused while the project's remap configuration and installed
/// dependency set hash to the same key and every cached dependency folder the
/// table points at still exists.
/// Each project path has its own lock, held while its table is (re)built.
#[derive(Debug, Default)]
pub struct RemappingCache {
    slots: Mutex<FxHashMap<PathBuf, Arc<Mutex<Option<CachedTable>>>>>,
}

#[derive(Debug)]
struct CachedTable {
    key: u64,
    table: RemappingTable,
}

impl RemappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, project: &Project) -> Arc<Mutex<Option<CachedTable>>> {
        let mut slots = self.slots.lock();
        Arc::clone(slots.entry(project.root().to_path_buf()).or_default())
    }

    /// Get the table for `project`, building it on a miss.
    pub fn get(
        &self,
        project: &Project,
        dependencies: &dyn DependencyManager,
    ) -> Result<RemappingTable> {
        let key = cache_key(project, dependencies);
        let slot = self.slot(project);
        let mut cached = slot.lock();

        if let Some(entry) = cached.as_ref() {
            if entry.key == key && cache_present(project, &entry.table) {
                tracing::debug!(project = %project.display_root(), "import remapping cache hit");
                return Ok(entry.table.clone());
            }
        }

        let table = build_remapping(project, dependencies)?;
        *cached = Some(CachedTable {
            key,
            table: table.clone(),
        });
        Ok(table)
    }

    /// Write corrections discovered during resolution back into the cached table.
    pub fn apply_corrections(&self, project: &Project, corrections: &[RemapCorrection]) {
        if corrections.is_empty() {
            return;
        }
        let slot = self.slot(project);
        let mut cached = slot.lock();
        if let Some(entry) = cached.as_mut() {
            for correction in corrections {
                entry.table.apply(correction);
            }
        }
    }

    /// Drop the cached table of `project`.
    pub fn invalidate(&self, project: &Project) {
        self.slots.lock().remove(project.root());
    }

    /// Number of projects with a cached table.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whether every dependency folder the table points at is still on disk.
fn cache_present(project: &Project, table: &RemappingTable) -> bool {
    project.cache_folder().is_dir()
        && table
            .iter()
            .filter_map(|(_, value)| cache_location(value))
            .all(|location| project.root().join(&location.prefix).is_dir())
}

/// Digest of the sorted remap entries and sorted installed dependency ids.
fn cache_key(project: &Project, dependencies: &dyn DependencyManager) -> u64 {
    let mut entries: Vec<&str> = project
        .config()
        .import_remapping
        .iter()
        .map(String::as_str)
        .collect();
    entries.sort_unstable();

    let mut installed: Vec<String> = dependencies
        .installed()
        .iter()
        .map(|d| d.cache_id())
        .collect();
    installed.sort_unstable();

    let mut hasher = FxHasher::default();
    entries.hash(&mut hasher);
    installed.hash(&mut hasher);
    hasher.finish()
}
