//! Compile planning: from a list of source paths to one compiler job per version.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::base::SourceId;
use crate::error::{Error, Result};
use crate::graph::{SourceTree, build_import_graph};
use crate::pragma::PragmaTable;
use crate::project::{DependencyManager, Project, verify_source_paths};
use crate::remap::{RemappingCache, RemappingTable};
use crate::version::{Toolchain, VersionMap, VersionSelector, compute_version_map, consolidate};

/// The first compiler release that accepts `--base-path`.
const BASE_PATH_SINCE: Version = Version::new(0, 6, 9);

/// One compiler invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileJob {
    pub version: Version,
    /// Sources to compile, sorted.
    pub sources: Vec<SourceId>,
    /// Remappings exercised by `sources`.
    pub remappings: RemappingTable,
    /// Contracts root, for compilers that support a base path.
    pub base_path: Option<PathBuf>,
}

/// Everything computed while planning a compile.
#[derive(Debug)]
pub struct CompilePlan {
    pub jobs: Vec<CompileJob>,
    pub tree: SourceTree,
    pub versions: VersionMap,
}

impl CompilePlan {
    /// The job compiling `id`, if any.
    pub fn job_for(&self, id: &SourceId) -> Option<&CompileJob> {
        self.jobs.iter().find(|job| job.sources.contains(id))
    }
}

/// Plans compiles of one project.
pub struct CompilePlanner<'a> {
    project: &'a Project,
    dependencies: &'a dyn DependencyManager,
    toolchain: &'a dyn Toolchain,
    cache: &'a RemappingCache,
}

impl<'a> CompilePlanner<'a> {
    pub fn new(
        project: &'a Project,
        dependencies: &'a dyn DependencyManager,
        toolchain: &'a dyn Toolchain,
        cache: &'a RemappingCache,
    ) -> Self {
        Self {
            project,
            dependencies,
            toolchain,
            cache,
        }
    }

    /// Plan a compile of every source under the contracts root.
    pub fn plan_all(&self) -> Result<CompilePlan> {
        let paths: Vec<PathBuf> = self
            .project
            .source_files()?
            .iter()
            .map(|id| self.project.path_of(id))
            .collect();
        self.plan(&paths)
    }

    /// Plan a compile of `paths` and everything they import.
    ///
    /// Fails if any input is not a source file, if a reached file cannot be
    /// read or parsed, if an import stays unresolved, or if some file's
    /// pragma cannot be met.
    pub fn plan<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CompilePlan> {
        verify_source_paths(paths)?;
        let mut entries: Vec<SourceId> = paths
            .iter()
            .map(|p| self.project.source_id(p.as_ref()))
            .collect();
        entries.sort();
        entries.dedup();

        let table = self.cache.get(self.project, self.dependencies)?;
        let mut tree = build_import_graph(&entries, self.project, self.dependencies, table);
        self.cache.apply_corrections(self.project, tree.corrections());

        if let Some(error) = tree.take_errors().into_values().flatten().next() {
            return Err(error);
        }
        if let Some((importer, statement)) = tree.unresolved().next() {
            return Err(Error::MissingSource {
                source_id: statement.raw_value.clone(),
                importer: Some(importer.to_string()),
            });
        }

        let pragmas = PragmaTable::load(self.project, tree.sources())?;
        let mut selector = VersionSelector::new(self.toolchain)?;
        let versions = compute_version_map(&entries, &tree, &pragmas, &mut selector)?;
        let versions = consolidate(versions, &tree);

        let jobs = versions
            .groups()
            .map(|(version, files)| self.job(&tree, version, files.iter().cloned().collect()))
            .collect();
        tracing::debug!(
            project = %self.project.display_root(),
            sources = tree.len(),
            groups = versions.len(),
            "planned compile"
        );

        Ok(CompilePlan {
            jobs,
            tree,
            versions,
        })
    }

    fn job(&self, tree: &SourceTree, version: &Version, sources: Vec<SourceId>) -> CompileJob {
        let mut remappings = tree.remappings_used(&sources);
        for (key, value) in tree.remapping().iter() {
            if !value.is_empty() && sources.iter().any(|id| id.as_str().contains(value)) {
                remappings.insert_if_absent(key, value);
            }
        }

        CompileJob {
            version: version.clone(),
            base_path: (*version >= BASE_PATH_SINCE)
                .then(|| self.project.contracts_folder().to_path_buf()),
            sources,
            remappings,
        }
    }
}
