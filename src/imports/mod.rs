//! Import statements: extraction from source text and resolution to source ids.

mod extract;
mod resolve;
mod statement;

pub use extract::{extract_import_lines, extract_import_lines_from_path};
pub use resolve::{ImportResolver, Resolution};
pub use statement::ImportStatement;
