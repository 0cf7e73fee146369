//! Source tree: the transitive import graph of a set of entry files.
//!
//! # Architecture
//!
//! The graph is built with an explicit work stack and two marks per node:
//!
//! 1. **InProgress** - the file's imports are recorded, some of its
//!    children are still on the stack
//! 2. **Done** - every child has been finished
//!
//! Reaching an `InProgress` node again is a back edge (an import cycle); it is
//! counted and not revisited. Reaching a `Done` node (a diamond) is skipped.
//! Each file is read and resolved exactly once.
//!
//! Problems with a single file (unreadable, missing terminator, malformed
//! literal) are recorded against that file and the traversal carries on.

mod build;

use std::collections::BTreeSet;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::SourceId;
use crate::error::Error;
use crate::imports::ImportStatement;
use crate::remap::{RemapCorrection, RemappingTable};

pub use build::build_import_graph;

/// Direct imports of every reached source, keys and values sorted.
pub type ImportGraph = IndexMap<SourceId, Vec<SourceId>>;

/// The result of walking the imports of a set of entry files.
#[derive(Debug, Default)]
pub struct SourceTree {
    imports: ImportGraph,
    statements: FxHashMap<SourceId, Vec<ImportStatement>>,
    errors: IndexMap<SourceId, Vec<Error>>,
    /// Root remapping table, with corrections applied.
    remapping: RemappingTable,
    corrections: Vec<RemapCorrection>,
    cycles: usize,
}

impl SourceTree {
    /// The import graph.
    pub fn imports(&self) -> &ImportGraph {
        &self.imports
    }

    /// Direct imports of `id` (empty for unknown ids).
    pub fn direct_imports(&self, id: &SourceId) -> &[SourceId] {
        self.imports.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.imports.contains_key(id)
    }

    /// Every reached source, sorted.
    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.imports.keys()
    }

    /// Everything `id` imports, directly or not, excluding `id` itself.
    pub fn transitive_imports(&self, id: &SourceId) -> BTreeSet<SourceId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<&SourceId> = self.direct_imports(id).iter().collect();
        while let Some(next) = stack.pop() {
            if next == id || !seen.insert(next.clone()) {
                continue;
            }
            stack.extend(self.direct_imports(next));
        }
        seen
    }

    /// The parsed import statements of `id`, resolved or not.
    pub fn statements(&self, id: &SourceId) -> &[ImportStatement] {
        self.statements
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Statements whose target could not be located, with their importer.
    pub fn unresolved(&self) -> impl Iterator<Item = (&SourceId, &ImportStatement)> {
        self.imports.keys().flat_map(move |id| {
            self.statements(id)
                .iter()
                .filter(|s| !s.is_resolved())
                .map(move |s| (id, s))
        })
    }

    /// Per-file problems met during the walk.
    pub fn errors(&self) -> &IndexMap<SourceId, Vec<Error>> {
        &self.errors
    }

    /// Move the per-file problems out of the tree.
    pub fn take_errors(&mut self) -> IndexMap<SourceId, Vec<Error>> {
        std::mem::take(&mut self.errors)
    }

    /// The root remapping table after self-healing corrections.
    pub fn remapping(&self) -> &RemappingTable {
        &self.remapping
    }

    /// Corrections made to the root remapping table during the walk.
    pub fn corrections(&self) -> &[RemapCorrection] {
        &self.corrections
    }

    /// Number of back edges (import cycles) met during the walk.
    pub fn cycles_detected(&self) -> usize {
        self.cycles
    }

    /// The remap pairs exercised by the imports of `files`.
    pub fn remappings_used<'a>(
        &self,
        files: impl IntoIterator<Item = &'a SourceId>,
    ) -> RemappingTable {
        let mut used = RemappingTable::new();
        for file in files {
            for (key, value) in self.statements(file).iter().filter_map(|s| s.remapping()) {
                used.insert(key, value);
            }
        }
        used
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}
