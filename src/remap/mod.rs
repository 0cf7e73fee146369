//! Import remapping: redirecting import prefixes into the dependency cache.
//!
//! ## Key Data Structures
//!
//! - [`RemapEntry`] - One configured `key=value` entry
//! - [`RemappingTable`] - The active `key → cache-path-prefix` table
//! - [`RemapCorrection`] - A fix-up discovered during resolution, applied by the table owner
//! - [`RemappingCache`] - Per-project memoization of built tables

mod builder;
mod cache;

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::project::Dependency;

pub use builder::{build_dependency_remapping, build_remapping};
pub use cache::RemappingCache;

// ============================================================================
// REMAP ENTRY
// ============================================================================

/// A configured remap entry, e.g. `@vendor=vendor/1.2.0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RemapEntry {
    pub key: String,
    pub value: String,
}

impl RemapEntry {
    /// Parse a `key=value` string. Separators are normalized to `/`.
    pub fn parse(entry: &str) -> Result<Self> {
        let parts: Vec<&str> = entry.split('=').collect();
        match parts.as_slice() {
            [key, value] if !key.trim().is_empty() => Ok(Self {
                key: key.trim().replace('\\', "/"),
                value: value.trim().replace('\\', "/"),
            }),
            _ => Err(Error::ConfigFormat {
                entry: entry.to_string(),
            }),
        }
    }

    fn value_segments(&self) -> Vec<&str> {
        self.value.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Interpret the value as a `name/version` (or bare `name`) dependency shorthand.
    ///
    /// - more than two segments: an opaque literal path, `None`
    /// - `name/version`: that pair
    /// - `name`: the single installed version of `name`; with several installed
    ///   versions this is `None`, or [`Error::AmbiguousDependency`] when `strict`
    pub fn dependency_target(
        &self,
        installed: &[Dependency],
        strict: bool,
    ) -> Result<Option<(String, String)>> {
        match self.value_segments().as_slice() {
            [name, version] => Ok(Some((name.to_string(), version.to_string()))),
            [name] => {
                let matches: Vec<&Dependency> =
                    installed.iter().filter(|d| d.name() == *name).collect();
                match matches.as_slice() {
                    [only] => Ok(Some((name.to_string(), only.version().to_string()))),
                    [] => Ok(None),
                    _ if strict => Err(Error::AmbiguousDependency {
                        name: name.to_string(),
                        options: matches.iter().map(|d| d.version().to_string()).collect(),
                    }),
                    _ => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Display for RemapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

// ============================================================================
// REMAPPING TABLE
// ============================================================================

/// A correction to a remapping discovered while resolving an import.
///
/// Resolution never mutates the table it reads; it hands corrections back
/// so the owner of the table can apply them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RemapCorrection {
    pub key: String,
    pub value: String,
}

/// The active remapping table. Keys are unique; insertion order is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemappingTable {
    entries: IndexMap<String, String>,
}

impl RemappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a mapping.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Insert unless the key is already taken. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, key: &str, value: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Find the longest key that occurs anywhere inside `literal`.
    ///
    /// Longest wins so that `@vendor/sub` beats `@vendor`. Among keys of equal
    /// length the earliest inserted wins.
    pub fn longest_match(&self, literal: &str) -> Option<(&str, &str)> {
        let mut best: Option<(&str, &str)> = None;
        for (key, value) in &self.entries {
            if key.is_empty() || !literal.contains(key.as_str()) {
                continue;
            }
            if best.is_none_or(|(k, _)| key.len() > k.len()) {
                best = Some((key, value));
            }
        }
        best
    }

    /// Apply a correction produced during resolution.
    pub fn apply(&mut self, correction: &RemapCorrection) {
        tracing::debug!(
            key = %correction.key,
            value = %correction.value,
            "correcting import remapping"
        );
        self.insert(correction.key.clone(), correction.value.clone());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `key=value` strings, the form compilers take on the command line.
    pub fn to_entries(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RemappingTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
