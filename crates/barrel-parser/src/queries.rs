//! Pre-compiled tree-sitter queries for module analysis.
//!
//! Matching only direct children of `program` keeps statements nested in
//! namespaces or blocks out of the module's export surface. Non-exported
//! declarations are collected by walking the root's children instead, since
//! their node kinds vary between grammar versions.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;
use crate::parser::Dialect;

/// Tree-sitter query selecting top-level exports and imports.
///
/// # Capture Names
///
/// - `export` - An `export_statement`
/// - `import` - An `import_statement`
pub const MODULE_QUERY: &str = r"
(program (export_statement) @export)

(program (import_statement) @import)
";

/// Capture index for `export`.
pub const CAPTURE_EXPORT: u32 = 0;

/// Capture index for `import`.
pub const CAPTURE_IMPORT: u32 = 1;

static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();

static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled module query for a dialect, compiling it on first use.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query does not match the grammar.
pub fn module_query(dialect: Dialect) -> Result<&'static Query, ParseError> {
    let cell = match dialect {
        Dialect::TypeScript => &COMPILED_QUERY_TS,
        Dialect::Tsx => &COMPILED_QUERY_TSX,
    };
    if let Some(query) = cell.get() {
        return Ok(query);
    }

    let query = compile_query(&dialect.language())?;
    Ok(cell.get_or_init(|| query))
}

fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Ok(Query::new(language, MODULE_QUERY)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles_for_both_dialects() {
        assert!(module_query(Dialect::TypeScript).is_ok());
        assert!(module_query(Dialect::Tsx).is_ok());
    }

    #[test]
    fn test_capture_indices_match_names() {
        let query = module_query(Dialect::TypeScript).expect("query should compile");
        let names = query.capture_names();
        assert_eq!(names[CAPTURE_EXPORT as usize], "export");
        assert_eq!(names[CAPTURE_IMPORT as usize], "import");
    }
}
