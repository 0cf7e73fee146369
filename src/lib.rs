//! # solgraph-base
//!
//! Import resolution, remapping and compiler-version selection for Solidity
//! projects.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! plan     → CompilePlanner: paths in, one job per compiler version out
//!   ↓
//! version  → Toolchain, per-file version selection, version map
//!   ↓
//! pragma   → `pragma solidity` extraction and constraint matching
//!   ↓
//! graph    → SourceTree: the transitive import graph
//!   ↓
//! imports  → Import statement extraction and resolution
//!   ↓
//! remap    → Remapping tables, their builder and cache
//!   ↓
//! project  → Project layout, config, dependencies
//!   ↓
//! base     → Primitives (SourceId, path helpers)
//! ```

// ============================================================================
// FOUNDATION
// ============================================================================

/// Foundation types: SourceId, slash paths, cache locations
pub mod base;

pub mod error;

/// Project layout, configuration and the dependency model
pub mod project;

// ============================================================================
// RESOLUTION
// ============================================================================

/// Remapping tables: `key=value` import prefix substitutions
pub mod remap;

pub mod imports;

/// The import graph of a set of entry files
pub mod graph;

// ============================================================================
// VERSION SELECTION
// ============================================================================

pub mod pragma;

pub mod version;

/// End-to-end compile planning
pub mod plan;

pub use base::SourceId;
pub use error::{Error, Result};
pub use graph::{SourceTree, build_import_graph};
pub use plan::{CompileJob, CompilePlan, CompilePlanner};
pub use pragma::PragmaSpec;
pub use project::{Dependency, DependencyManager, Project, SolidityConfig};
pub use remap::{RemappingCache, RemappingTable};
pub use version::{Toolchain, VersionMap};
