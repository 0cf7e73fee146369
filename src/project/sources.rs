use std::path::Path;

use walkdir::WalkDir;

use super::Project;
use crate::base::{CACHE_FOLDER, SourceId};
use crate::error::{Error, Result};

/// Extension of compilable sources (without the dot).
pub const SOURCE_EXTENSION: &str = "sol";

impl Project {
    /// Collect every source file under the contracts root, skipping the dependency cache.
    ///
    /// The result is sorted for deterministic downstream ordering.
    pub fn source_files(&self) -> Result<Vec<SourceId>> {
        let root = self.contracts_folder();
        if !root.is_dir() {
            return Err(Error::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "contracts folder not found"),
            ));
        }

        let mut errors = Vec::new();
        let mut ids = Vec::new();
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.file_name() != CACHE_FOLDER);

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if has_source_extension(entry.path()) {
                        ids.push(self.source_id(entry.path()));
                    }
                }
                Ok(_) => {}
                Err(e) => errors.push(e),
            }
        }

        if let Some(first) = errors.into_iter().next() {
            let path = first.path().unwrap_or(root).to_path_buf();
            return Err(Error::io(path, first.into()));
        }

        ids.sort();
        Ok(ids)
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == SOURCE_EXTENSION)
}

/// Reject inputs that are not Solidity sources, naming every offender at once.
pub fn verify_source_paths<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    let invalid: Vec<String> = paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !has_source_extension(p))
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(Error::NonSourceFile { files: invalid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::SolidityConfig;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_source_files_skips_cache() {
        let tmp = TempDir::new().unwrap();
        let contracts = tmp.path().join("contracts");
        fs::create_dir_all(contracts.join("sub")).unwrap();
        fs::create_dir_all(contracts.join(".cache/dep/1.0.0")).unwrap();
        fs::write(contracts.join("B.sol"), "").unwrap();
        fs::write(contracts.join("sub/A.sol"), "").unwrap();
        fs::write(contracts.join("notes.md"), "").unwrap();
        fs::write(contracts.join(".cache/dep/1.0.0/Dep.sol"), "").unwrap();

        let project = Project::new(tmp.path(), "contracts", SolidityConfig::default()).unwrap();
        let ids: Vec<_> = project
            .source_files()
            .unwrap()
            .into_iter()
            .map(|id| id.to_string())
            .collect();

        assert_eq!(ids, vec!["contracts/B.sol", "contracts/sub/A.sol"]);
    }

    #[test]
    fn test_verify_source_paths() {
        assert!(verify_source_paths(&["a/A.sol", "B.sol"]).is_ok());

        let err = verify_source_paths(&["A.sol", "b.vy", "c.json"]).unwrap_err();
        match err {
            Error::NonSourceFile { files } => assert_eq!(files, vec!["b.vy", "c.json"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
