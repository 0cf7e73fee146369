//! Source identifiers for tracking source files.

use std::borrow::Borrow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::paths::{relative_path, to_slash};

/// A normalized, project-root-relative identifier for a source file.
///
/// `SourceId` is the single key type used by the remapper, the import graph
/// and the version map. Two files are the same entity iff their ids are equal.
///
/// Normalization:
/// - backslashes become `/`
/// - a leading `./` is dropped
/// - empty and `.` segments are collapsed
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Create a SourceId from a slash (or backslash) separated path string.
    pub fn new(id: impl AsRef<str>) -> Self {
        let raw = id.as_ref().replace('\\', "/");
        let normalized = raw
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(Arc::from(normalized))
    }

    /// Compute the id of `path` relative to `root`.
    ///
    /// Files outside `root` get leading `..` segments.
    pub fn from_path(path: &Path, root: &Path) -> Self {
        Self::new(to_slash(&relative_path(path, root)))
    }

    /// Get the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/` separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Check the file extension (without the dot).
    pub fn has_extension(&self, ext: &str) -> bool {
        Path::new(self.as_str())
            .extension()
            .is_some_and(|e| e == ext)
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    #[inline]
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    #[inline]
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_equality() {
        let a = SourceId::new("contracts/Token.sol");
        let b = SourceId::new("./contracts//Token.sol");
        let c = SourceId::new("contracts\\Token.sol");
        let d = SourceId::new("contracts/Other.sol");

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_source_id_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(SourceId::new("A.sol"));
        set.insert(SourceId::new("B.sol"));
        set.insert(SourceId::new("./A.sol")); // duplicate

        assert_eq!(set.len(), 2);
        assert!(set.contains("A.sol"));
    }

    #[test]
    fn test_source_id_from_path() {
        let root = Path::new("/project");
        let id = SourceId::from_path(Path::new("/project/contracts/A.sol"), root);
        assert_eq!(id.as_str(), "contracts/A.sol");

        let outside = SourceId::from_path(Path::new("/elsewhere/B.sol"), root);
        assert_eq!(outside.as_str(), "../elsewhere/B.sol");
    }

    #[test]
    fn test_source_id_extension() {
        assert!(SourceId::new("a/B.sol").has_extension("sol"));
        assert!(!SourceId::new("a/B.vy").has_extension("sol"));
        assert!(!SourceId::new("a/sol").has_extension("sol"));
    }
}
