//! Errors raised while resolving imports and selecting compiler versions.

use std::path::PathBuf;

use semver::Version;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong between reading a source and producing a compile plan.
#[derive(Error, Debug)]
pub enum Error {
    /// A remap entry that is not `key=value`.
    #[error(
        "Incorrectly formatted import remapping '{entry}'. Expected '@value_1=value2'."
    )]
    ConfigFormat { entry: String },

    /// A remap shorthand naming a dependency installed at several versions.
    #[error(
        "Ambiguous version reference for dependency '{name}'. \
         Please set the import remapping value to {name}/{{version}} \
         where 'version' is one of '{}'.",
        options.join(", ")
    )]
    AmbiguousDependency { name: String, options: Vec<String> },

    /// An import statement whose quoted literal could not be parsed.
    #[error("Error parsing import statement '{raw}' in '{}'.", file.display())]
    UnresolvableImport { file: PathBuf, raw: String },

    /// An import statement with no terminating `;` before end of file.
    #[error("Import statement missing semicolon in '{}'.", file.display())]
    MissingTerminator { file: PathBuf },

    /// A `pragma solidity` expression that is not a version constraint.
    #[error("Invalid version pragma '{expression}': {reason}")]
    InvalidPragma { expression: String, reason: String },

    /// No installed or installable compiler satisfies a pragma.
    #[error("Solidity version specification '{spec}' could not be met.")]
    UnsatisfiableVersion { spec: String },

    /// Nothing is installed and nothing can be installed.
    #[error("No Solidity compiler versions are installed or available.")]
    NoCompilerVersions,

    /// A required source does not exist on disk.
    #[error("{}", missing_source_message(.source_id, .importer.as_deref()))]
    MissingSource {
        source_id: String,
        importer: Option<String>,
    },

    /// Inputs that are not Solidity sources.
    #[error("Unable to compile '{}' using Solidity compiler.", files.join("', '"))]
    NonSourceFile { files: Vec<String> },

    /// Failure reported by the compiler toolchain.
    #[error("compiler toolchain: {0}")]
    Toolchain(String),

    /// Failure installing a specific compiler version.
    #[error("failed to install compiler {version}: {reason}")]
    Install { version: Version, reason: String },

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "config")]
    #[error("invalid project config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check whether a missing source looks like a dependency rather than a project file.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingSource { source_id, .. } if source_id.starts_with('@'))
    }
}

fn missing_source_message(source_id: &str, importer: Option<&str>) -> String {
    let origin = importer
        .map(|i| format!(" (imported by '{i}')"))
        .unwrap_or_default();
    if source_id.starts_with('@') {
        format!(
            "Source '{source_id}' not found{origin}. \
             Looks like a missing dependency: check the project's dependencies \
             and import remappings."
        )
    } else {
        format!("Source '{source_id}' not found{origin}. Looks like a missing project file.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_dependency_message() {
        let err = Error::MissingSource {
            source_id: "@openzeppelin/token/ERC20.sol".into(),
            importer: Some("Token.sol".into()),
        };
        let msg = err.to_string();
        assert!(err.is_missing_dependency());
        assert!(msg.contains("missing dependency"));
        assert!(msg.contains("Token.sol"));
    }

    #[test]
    fn test_missing_source_project_message() {
        let err = Error::MissingSource {
            source_id: "interfaces/IFoo.sol".into(),
            importer: None,
        };
        assert!(!err.is_missing_dependency());
        assert!(err.to_string().contains("missing project file"));
    }

    #[test]
    fn test_non_source_file_lists_all() {
        let err = Error::NonSourceFile {
            files: vec!["a.vy".into(), "b.txt".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unable to compile 'a.vy', 'b.txt' using Solidity compiler."
        );
    }

    #[test]
    fn test_ambiguous_dependency_message() {
        let err = Error::AmbiguousDependency {
            name: "vendor".into(),
            options: vec!["1.0.0".into(), "2.0.0".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("vendor/{version}"));
        assert!(msg.contains("1.0.0, 2.0.0"));
    }
}
