//! Path helpers: slash conversion, relative paths and dependency-cache paths.

use std::path::{Component, Path, PathBuf};

/// Name of the folder (inside the contracts root) holding unpacked dependencies.
pub const CACHE_FOLDER: &str = ".cache";

/// Render a path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        let part = match component {
            Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy(),
            Component::RootDir => {
                out.push('/');
                continue;
            }
            Component::CurDir => continue,
            Component::ParentDir => "..".into(),
            Component::Normal(name) => name.to_string_lossy(),
        };
        if !out.is_empty() && !out.ends_with('/') {
            out.push('/');
        }
        out.push_str(&part);
    }
    out
}

/// Compute `path` relative to `base`, inserting `..` where `path` lies outside.
///
/// Both paths are expected to be absolute (or both relative to the same
/// directory). Purely lexical: nothing touches the filesystem.
pub fn relative_path(path: &Path, base: &Path) -> PathBuf {
    let path_norm = normalize(path);
    let path: Vec<Component<'_>> = path_norm.components().collect();
    let base_norm = normalize(base);
    let base: Vec<Component<'_>> = base_norm.components().collect();

    let common = path
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push("..");
    }
    for component in &path[common..] {
        out.push(component.as_os_str());
    }
    out
}

/// Lexically remove `.` and resolve `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A slash path pointing into the dependency cache, split at `.cache/{name}/{version}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLocation<'a> {
    /// Everything up to and including the version segment.
    pub prefix: String,
    /// Dependency name (segment after `.cache`).
    pub name: &'a str,
    /// Dependency version (segment after the name).
    pub version: &'a str,
    /// Remaining segments after the version.
    pub rest: Vec<&'a str>,
}

impl CacheLocation<'_> {
    /// The segments after the version joined with `/`.
    pub fn suffix(&self) -> String {
        self.rest.join("/")
    }
}

/// Locate the `.cache/{name}/{version}` triple in a slash path.
///
/// Returns `None` when there is no cache marker or it is not followed by
/// both a name and a version segment.
pub fn cache_location(slash_path: &str) -> Option<CacheLocation<'_>> {
    let segments: Vec<&str> = slash_path.split('/').collect();
    let cache_index = segments.iter().position(|s| *s == CACHE_FOLDER)?;
    let name = *segments.get(cache_index + 1)?;
    let version = *segments.get(cache_index + 2)?;
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some(CacheLocation {
        prefix: segments[..=cache_index + 2].join("/"),
        name,
        version,
        rest: segments[cache_index + 3..].to_vec(),
    })
}

/// Join a (possibly empty) slash prefix and a slash suffix.
pub fn join_slash(prefix: &str, suffix: &str) -> String {
    match (prefix.trim_end_matches('/'), suffix.trim_start_matches('/')) {
        ("", s) => s.to_string(),
        (p, "") => p.to_string(),
        (p, s) => format!("{p}/{s}"),
    }
}
