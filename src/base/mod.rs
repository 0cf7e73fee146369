//! Foundation types for the solgraph toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`SourceId`] - Normalized project-relative source identifiers
//! - [`CacheLocation`] - A path split at its `.cache/{name}/{version}` marker
//! - Lexical path helpers ([`relative_path`], [`to_slash`], [`normalize`])
//!
//! This module has NO dependencies on other solgraph modules.

mod paths;
mod source_id;

pub use paths::{
    CACHE_FOLDER, CacheLocation, cache_location, join_slash, normalize, relative_path, to_slash,
};
pub use source_id::SourceId;
