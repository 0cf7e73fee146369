//! Version pragmas: `pragma solidity <constraint>;` extraction and matching.
//!
//! Constraints are tokenized with `logos` and evaluated with `semver`. Each
//! `||` alternative becomes one [`VersionReq`]; within an alternative the
//! comparators are ANDed. A bare version is an exact pin (`0.8.12` is
//! `=0.8.12`), a bare wildcard (`0.8.x`) matches its range.

mod lexer;
mod table;

use std::fmt;

use semver::{Op, Version, VersionReq};

use crate::error::{Error, Result};
use lexer::{Token, tokenize};

pub use table::{PragmaTable, pragma_from_path};

/// A parsed `pragma solidity` constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PragmaSpec {
    expression: String,
    alternatives: Vec<VersionReq>,
}

impl PragmaSpec {
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        let invalid = |reason: String| Error::InvalidPragma {
            expression: expression.to_string(),
            reason,
        };

        let tokens = tokenize(expression)
            .map_err(|offset| invalid(format!("unexpected character at offset {offset}")))?;

        let mut alternatives = Vec::new();
        let mut comparators: Vec<String> = Vec::new();
        let mut pending: Option<&str> = None;

        for (token, text) in tokens {
            match token {
                Token::Version => {
                    let op = pending.take().unwrap_or(if is_wildcard(text) { "" } else { "=" });
                    comparators.push(format!("{op}{text}"));
                }
                Token::Or => {
                    if pending.is_some() || comparators.is_empty() {
                        return Err(invalid("empty alternative".into()));
                    }
                    alternatives.push(version_req(&comparators).map_err(&invalid)?);
                    comparators.clear();
                }
                op => {
                    if pending.is_some() {
                        return Err(invalid(format!("operator '{text}' follows another operator")));
                    }
                    pending = op.operator();
                }
            }
        }

        if pending.is_some() || comparators.is_empty() {
            return Err(invalid("missing version".into()));
        }
        alternatives.push(version_req(&comparators).map_err(&invalid)?);

        Ok(Self {
            expression: expression.to_string(),
            alternatives,
        })
    }

    /// The expression as written.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether `version` satisfies any alternative. Build metadata is ignored.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// The pinned version, when the constraint is a single `=` comparator on a full version.
    pub fn exact_pin(&self) -> Option<Version> {
        let [req] = self.alternatives.as_slice() else {
            return None;
        };
        let [comparator] = req.comparators.as_slice() else {
            return None;
        };
        if comparator.op != Op::Exact {
            return None;
        }
        Some(Version {
            major: comparator.major,
            minor: comparator.minor?,
            patch: comparator.patch?,
            pre: comparator.pre.clone(),
            build: Default::default(),
        })
    }

    pub fn is_exact_pin(&self) -> bool {
        self.exact_pin().is_some()
    }

    /// The highest of `options` that satisfies the constraint.
    pub fn select<'a>(&self, options: impl IntoIterator<Item = &'a Version>) -> Option<Version> {
        options
            .into_iter()
            .filter(|v| self.matches(v))
            .max()
            .cloned()
    }
}

impl fmt::Display for PragmaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

fn is_wildcard(version: &str) -> bool {
    version.contains(['x', 'X', '*'])
}

fn version_req(comparators: &[String]) -> std::result::Result<VersionReq, String> {
    VersionReq::parse(&comparators.join(", ")).map_err(|e| e.to_string())
}

/// The constraint expression of the first `pragma solidity` line in `text`.
///
/// The expression runs to the first `;` or the end of its line.
pub fn extract_pragma(text: &str) -> Option<&str> {
    text.lines().find_map(|line| {
        let rest = line.trim_start().strip_prefix("pragma")?;
        let rest = rest.trim_start().strip_prefix("solidity")?;
        let end = rest.find(';').unwrap_or(rest.len());
        Some(rest[..end].trim())
    })
}

/// Parse the pragma of source `text`.
///
/// A missing pragma is `None`. So is a malformed one, which is logged.
pub fn pragma_from_str(text: &str) -> Option<PragmaSpec> {
    let expression = extract_pragma(text)?;
    match PragmaSpec::parse(expression) {
        Ok(spec) => Some(spec),
        Err(error) => {
            tracing::warn!(%error, "ignoring version pragma");
            None
        }
    }
}
