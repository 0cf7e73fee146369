use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::base::SourceId;
use crate::error::{Error, Result};

/// One import statement of a source file, resolved once against a remapping table.
///
/// Only the literal, quote and separator are guaranteed; the remaining fields
/// are filled in by successful resolution.
#[derive(Clone, Debug)]
pub struct ImportStatement {
    /// Quote character used around the literal.
    pub quote: char,
    /// Path separator used inside the literal.
    pub separator: char,
    /// The literal target as written.
    pub raw_value: String,

    /// Remap key/value used to expand the literal.
    pub remap_key: Option<String>,
    pub remap_value: Option<String>,

    /// Set when the import resolved into a cached dependency.
    pub dependency_name: Option<SmolStr>,
    pub dependency_version: Option<SmolStr>,

    /// Set once the target file is located.
    pub source_id: Option<SourceId>,
    pub path: Option<PathBuf>,
}

impl ImportStatement {
    /// Parse the quoted literal out of a raw import statement.
    ///
    /// `file` is the importing file, cited when the literal is malformed.
    pub fn parse(raw: &str, file: &Path) -> Result<Self> {
        let quote = if raw.contains('"') { '"' } else { '\'' };
        let separator = if raw.contains('\\') { '\\' } else { '/' };

        let malformed = || Error::UnresolvableImport {
            file: file.to_path_buf(),
            raw: raw.to_string(),
        };
        let start = raw.find(quote).ok_or_else(malformed)? + quote.len_utf8();
        let len = raw[start..].find(quote).ok_or_else(malformed)?;

        Ok(Self {
            quote,
            separator,
            raw_value: raw[start..start + len].to_string(),
            remap_key: None,
            remap_value: None,
            dependency_name: None,
            dependency_version: None,
            source_id: None,
            path: None,
        })
    }

    /// The literal after remap expansion, with `/` separators.
    pub fn value(&self) -> String {
        let value = match (&self.remap_key, &self.remap_value) {
            (Some(key), Some(value)) => self.raw_value.replacen(key.as_str(), value, 1),
            _ => self.raw_value.clone(),
        };
        if self.separator == '\\' {
            value.replace('\\', "/")
        } else {
            value
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.source_id.is_some()
    }

    /// Whether the literal was relative to the importing file.
    pub fn is_relative(&self) -> bool {
        self.raw_value.starts_with('.')
    }

    /// The remap pair used, if any.
    pub fn remapping(&self) -> Option<(&str, &str)> {
        Some((self.remap_key.as_deref()?, self.remap_value.as_deref()?))
    }
}

impl PartialEq for ImportStatement {
    fn eq(&self, other: &Self) -> bool {
        match (&self.path, &other.path) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.raw_value == other.raw_value,
            _ => false,
        }
    }
}

impl Eq for ImportStatement {}

impl Hash for ImportStatement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.path {
            Some(path) => path.hash(state),
            None => Path::new(&self.raw_value).hash(state),
        }
    }
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_value)
    }
}
