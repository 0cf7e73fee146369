use indexmap::IndexSet;
use rustc_hash::FxHashMap;

use super::SourceTree;
use crate::base::SourceId;
use crate::error::Error;
use crate::imports::{ImportResolver, ImportStatement, extract_import_lines_from_path};
use crate::project::{DependencyManager, Project};
use crate::remap::{RemappingTable, build_dependency_remapping};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// A file whose imports are being walked.
struct Frame {
    id: SourceId,
    children: Vec<SourceId>,
    next: usize,
}

/// Walk the imports of `entries` and every file they reach.
///
/// `remapping` is the root project's table. Files inside an unpacked
/// dependency resolve against that dependency's own table instead. Corrections
/// found during resolution are applied to the table that produced them; those
/// made to the root table are also reported in [`SourceTree::corrections`].
pub fn build_import_graph(
    entries: &[SourceId],
    project: &Project,
    dependencies: &dyn DependencyManager,
    remapping: RemappingTable,
) -> SourceTree {
    let mut walker = Walker {
        project,
        resolver: ImportResolver::new(project, dependencies),
        dependencies,
        tree: SourceTree {
            remapping,
            ..SourceTree::default()
        },
        dependency_tables: FxHashMap::default(),
        marks: FxHashMap::default(),
    };

    let mut stack: Vec<Frame> = Vec::new();
    for entry in entries {
        if walker.marks.contains_key(entry) {
            continue;
        }
        stack.push(walker.enter(entry.clone(), None));

        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            let Some(child) = frame.children.get(frame.next).cloned() else {
                if let Some(done) = stack.pop() {
                    walker.marks.insert(done.id, Mark::Done);
                }
                continue;
            };
            frame.next += 1;
            let importer = frame.id.clone();

            match walker.marks.get(&child) {
                None => stack.push(walker.enter(child, Some(&importer))),
                Some(Mark::InProgress) => {
                    tracing::debug!(from = %importer, to = %child, "import cycle");
                    walker.tree.cycles += 1;
                }
                Some(Mark::Done) => {}
            }
        }
    }

    let mut tree = walker.tree;
    tree.imports.sort_keys();
    tree.errors.sort_keys();
    tracing::debug!(
        sources = tree.imports.len(),
        cycles = tree.cycles,
        errors = tree.errors.len(),
        "built import graph"
    );
    tree
}

struct Walker<'a> {
    project: &'a Project,
    resolver: ImportResolver<'a>,
    dependencies: &'a dyn DependencyManager,
    tree: SourceTree,
    /// Tables for files inside unpacked dependencies, keyed by `(name, version)`.
    dependency_tables: FxHashMap<(String, String), RemappingTable>,
    marks: FxHashMap<SourceId, Mark>,
}

impl Walker<'_> {
    /// Mark `id` in progress, resolve its imports and return its frame.
    fn enter(&mut self, id: SourceId, importer: Option<&SourceId>) -> Frame {
        self.marks.insert(id.clone(), Mark::InProgress);
        let children = self.visit(&id, importer);
        self.tree.imports.insert(id.clone(), children.clone());
        Frame {
            id,
            children,
            next: 0,
        }
    }

    fn visit(&mut self, id: &SourceId, importer: Option<&SourceId>) -> Vec<SourceId> {
        let path = self.project.path_of(id);
        if !path.is_file() {
            self.record(
                id,
                Error::MissingSource {
                    source_id: id.to_string(),
                    importer: importer.map(ToString::to_string),
                },
            );
            return Vec::new();
        }

        let lines = match extract_import_lines_from_path(&path) {
            Ok(lines) => lines,
            Err(error) => {
                self.record(id, error);
                return Vec::new();
            }
        };

        let context = self.project.dependency_of(id);
        if let Some(key) = &context {
            self.ensure_dependency_table(id, key);
        }

        let mut statements: IndexSet<ImportStatement> = IndexSet::new();
        for line in &lines {
            let table = match &context {
                Some(key) => self.dependency_tables.get(key).unwrap_or(&self.tree.remapping),
                None => &self.tree.remapping,
            };
            let resolution = match self.resolver.resolve(line, &path, table) {
                Ok(resolution) => resolution,
                Err(error) => {
                    self.record(id, error);
                    continue;
                }
            };

            if let Some(correction) = &resolution.correction {
                match context
                    .as_ref()
                    .and_then(|key| self.dependency_tables.get_mut(key))
                {
                    Some(table) => table.apply(correction),
                    None => {
                        self.tree.remapping.apply(correction);
                        self.tree.corrections.push(correction.clone());
                    }
                }
            }
            statements.insert(resolution.statement);
        }

        let mut children: Vec<SourceId> = statements
            .iter()
            .filter_map(|s| s.source_id.clone())
            .collect();
        children.sort();
        children.dedup();

        self.tree
            .statements
            .insert(id.clone(), statements.into_iter().collect());
        children
    }

    fn ensure_dependency_table(&mut self, id: &SourceId, key: &(String, String)) {
        if self.dependency_tables.contains_key(key) {
            return;
        }
        let (name, version) = key;
        let Some(dependency) = self.dependencies.get(name, version) else {
            tracing::debug!(
                dependency = %name,
                version = %version,
                "unknown dependency; resolving its imports with the project table"
            );
            return;
        };
        match build_dependency_remapping(self.project, &dependency) {
            Ok(table) => {
                self.dependency_tables.insert(key.clone(), table);
            }
            Err(error) => self.record(id, error),
        }
    }

    fn record(&mut self, id: &SourceId, error: Error) {
        tracing::warn!(source = %id, error = %error, "skipping imports");
        self.tree.errors.entry(id.clone()).or_default().push(error);
    }
}
