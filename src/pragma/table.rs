use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rayon::prelude::*;

use super::{PragmaSpec, pragma_from_str};
use crate::base::SourceId;
use crate::error::{Error, Result};
use crate::project::Project;

/// Read the pragma of the source at `path`.
pub fn pragma_from_path(path: &Path) -> Result<Option<PragmaSpec>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(pragma_from_str(&text))
}

/// The pragma of every source in a compile, `None` meaning unconstrained.
#[derive(Clone, Debug, Default)]
pub struct PragmaTable {
    specs: IndexMap<SourceId, Option<PragmaSpec>>,
}

impl PragmaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the pragmas of `sources` in parallel.
    pub fn load<'a>(
        project: &Project,
        sources: impl IntoIterator<Item = &'a SourceId>,
    ) -> Result<Self> {
        let sources: Vec<&SourceId> = sources.into_iter().collect();

        let specs = sources
            .par_iter()
            .map(|id| -> Result<(SourceId, Option<PragmaSpec>)> {
                let spec = pragma_from_path(&project.path_of(id))?;
                Ok(((*id).clone(), spec))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(sources = specs.len(), "loaded version pragmas");
        Ok(Self {
            specs: specs.into_iter().collect(),
        })
    }

    pub fn insert(&mut self, id: SourceId, spec: Option<PragmaSpec>) {
        self.specs.insert(id, spec);
    }

    /// The pragma of `id`; `None` when unconstrained or unknown.
    pub fn get(&self, id: &SourceId) -> Option<&PragmaSpec> {
        self.specs.get(id).and_then(Option::as_ref)
    }

    pub fn is_exact_pin(&self, id: &SourceId) -> bool {
        self.get(id).is_some_and(PragmaSpec::is_exact_pin)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, Option<&PragmaSpec>)> {
        self.specs.iter().map(|(id, spec)| (id, spec.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl FromIterator<(SourceId, Option<PragmaSpec>)> for PragmaTable {
    fn from_iter<T: IntoIterator<Item = (SourceId, Option<PragmaSpec>)>>(iter: T) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}
