//! Import resolution: turning an import literal into a [`SourceId`].
//!
//! Resolution order:
//!
//! 1. Parse the quoted literal
//! 2. Expand the longest matching remap key (skipped for `./` and `../` literals)
//! 3. Pick a base directory: the importer's directory for relative literals,
//!    then the project root, then the contracts root, then a configured
//!    external project for `@name` keys
//! 4. Otherwise, for cache paths, retry with the dependency's own source
//!    folder inserted after the version and report a [`RemapCorrection`]
//! 5. Canonicalize and compute the root-relative [`SourceId`]
//!
//! Failing to locate the file is not an error; the statement is returned unresolved.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use super::ImportStatement;
use crate::base::{SourceId, cache_location, join_slash, normalize};
use crate::error::Result;
use crate::project::{DependencyManager, Project};
use crate::remap::{RemapCorrection, RemappingTable};

/// The outcome of resolving one import statement.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub statement: ImportStatement,
    /// A fix for the remap entry that was used, when the repair pass found the file.
    pub correction: Option<RemapCorrection>,
}

/// Resolves import statements of one project.
pub struct ImportResolver<'a> {
    project: &'a Project,
    dependencies: &'a dyn DependencyManager,
}

impl<'a> ImportResolver<'a> {
    pub fn new(project: &'a Project, dependencies: &'a dyn DependencyManager) -> Self {
        Self {
            project,
            dependencies,
        }
    }

    /// Resolve `raw` (a full import statement) found in `importing_file`.
    ///
    /// Only a malformed literal is an error.
    pub fn resolve(
        &self,
        raw: &str,
        importing_file: &Path,
        table: &RemappingTable,
    ) -> Result<Resolution> {
        let mut statement = ImportStatement::parse(raw, importing_file)?;

        if !statement.is_relative() {
            if let Some((key, value)) = table.longest_match(&statement.raw_value) {
                statement.remap_key = Some(key.to_string());
                statement.remap_value = Some(value.to_string());
            }
        }

        let value = statement.value();
        let mut correction = None;
        let located = match self.find_file(&statement, &value, importing_file) {
            Some(path) => Some(path),
            None => self.repair(&mut statement, &value).map(|(path, fix)| {
                correction = fix;
                path
            }),
        };

        match located {
            Some(path) => self.locate(&mut statement, &path),
            None => tracing::trace!(
                import = %statement.raw_value,
                file = %importing_file.display(),
                "import left unresolved"
            ),
        }

        Ok(Resolution {
            statement,
            correction,
        })
    }

    fn find_file(
        &self,
        statement: &ImportStatement,
        value: &str,
        importing_file: &Path,
    ) -> Option<PathBuf> {
        if statement.is_relative() {
            return importing_file.parent().map(|dir| dir.join(value));
        }

        let root = self.project.root();
        let contracts = self.project.contracts_folder();
        if let Some(path) = [root.join(value), contracts.join(value)]
            .into_iter()
            .find(|path| path.is_file())
        {
            return Some(path);
        }

        // `@name` keys may name a configured dependency living in another project.
        let key = statement.remap_key.as_deref()?;
        let name = key.strip_prefix('@')?;
        let external = self.project.config().dependency(name)?.project.as_ref()?;
        let base = root.join(external);
        let unmapped = statement
            .raw_value
            .strip_prefix(key)
            .map(|rest| rest.trim_start_matches(['/', '\\']));
        [Some(value), unmapped]
            .into_iter()
            .flatten()
            .map(|candidate| base.join(candidate))
            .find(|path| path.is_file())
    }

    /// Retry a cache path with the dependency's source folder inserted after its version.
    ///
    /// Many dependencies keep sources in a subfolder (`contracts`, `src`) that the
    /// default remap value leaves out.
    fn repair(
        &self,
        statement: &mut ImportStatement,
        value: &str,
    ) -> Option<(PathBuf, Option<RemapCorrection>)> {
        let location = cache_location(value)?;
        let dependency = self
            .dependencies
            .get(location.name, location.version)?;
        let folder = dependency.contracts_folder_name();
        if folder.is_empty() || location.rest.first() == Some(&folder.as_str()) {
            return None;
        }

        let fixed_prefix = join_slash(&location.prefix, &folder);
        let candidate = join_slash(&fixed_prefix, &location.suffix());
        let path = [self.project.root(), self.project.contracts_folder()]
            .into_iter()
            .map(|base| base.join(&candidate))
            .find(|path| path.is_file())?;

        let correction = match (&statement.remap_key, &statement.remap_value) {
            (Some(key), Some(old)) if old.trim_end_matches('/') == location.prefix => {
                tracing::warn!(
                    key = %key,
                    from = %old,
                    to = %fixed_prefix,
                    "import remapping is missing the dependency's source folder"
                );
                Some(RemapCorrection {
                    key: key.clone(),
                    value: fixed_prefix.clone(),
                })
            }
            _ => None,
        };
        if let Some(fix) = &correction {
            statement.remap_value = Some(fix.value.clone());
        }

        Some((path, correction))
    }

    fn locate(&self, statement: &mut ImportStatement, path: &Path) {
        let path = path
            .canonicalize()
            .unwrap_or_else(|_| normalize(path));
        let source_id = SourceId::from_path(&path, self.project.root());

        if let Some(location) = cache_location(source_id.as_str()) {
            statement.dependency_name = Some(SmolStr::new(location.name));
            statement.dependency_version = Some(SmolStr::new(location.version));
        }

        tracing::trace!(import = %statement.raw_value, source_id = %source_id, "resolved import");
        statement.source_id = Some(source_id);
        statement.path = Some(path);
    }
}
