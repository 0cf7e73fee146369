use std::fs;
use std::path::Path;

use indexmap::IndexSet;

use crate::error::{Error, Result};

const IMPORT_KEYWORD: &str = "import";
const TERMINATOR: char = ';';

/// Read `path` and extract its import statements.
pub fn extract_import_lines_from_path(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    extract_import_lines(path, &text)
}

/// Extract each import statement from source text.
///
/// A statement starts on a line whose trimmed text begins with the `import`
/// keyword and runs until the first `;`, joining continuation lines with a
/// single space. Identical statements are collapsed, keeping first-seen order.
/// `path` is only used for error reporting.
pub fn extract_import_lines(path: &Path, text: &str) -> Result<Vec<String>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut statements: IndexSet<String> = IndexSet::new();

    let mut index = 0;
    while index < lines.len() {
        let line = lines[index].trim();
        index += 1;
        if !starts_with_import(line) {
            continue;
        }

        let mut statement = line.to_string();
        while !statement.contains(TERMINATOR) {
            let Some(next) = lines.get(index) else {
                return Err(Error::MissingTerminator {
                    file: path.to_path_buf(),
                });
            };
            index += 1;
            let next = next.trim();
            if !next.is_empty() {
                statement.push(' ');
                statement.push_str(next);
            }
        }

        statements.insert(statement);
    }

    Ok(statements.into_iter().collect())
}

/// `import` followed by a boundary, so identifiers like `importer` don't match.
fn starts_with_import(line: &str) -> bool {
    line.strip_prefix(IMPORT_KEYWORD).is_some_and(|rest| {
        rest.chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '{' | '*'))
    })
}
