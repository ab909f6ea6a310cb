//! Error types for the barrel-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while setting up tree-sitter or parsing a module.
//!
//! Syntax errors inside a module are *not* [`ParseError`]s: the grammar
//! recovers from them and the analyzer records a warning instead.

/// Errors that can occur during source analysis.
///
/// # Examples
///
/// ```
/// use barrel_parser::ParseError;
///
/// fn describe(err: &ParseError) -> &'static str {
///     match err {
///         ParseError::LanguageInit => "grammar could not be loaded",
///         ParseError::QueryCompile { .. } => "query is invalid for this grammar",
///         ParseError::Parse => "parser produced no tree",
///     }
/// }
///
/// assert_eq!(describe(&ParseError::Parse), "parser produced no tree");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the grammar on the parser.
    #[error("failed to set tree-sitter language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    #[error("failed to compile query at offset {offset}: {message}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// Description reported by tree-sitter.
        message: String,
    },

    /// The parser returned no tree (cancelled or out of memory).
    #[error("failed to parse source code")]
    Parse,
}

impl ParseError {
    /// Returns `true` if the error only affects the file being parsed.
    ///
    /// Grammar and query failures affect every file and are not recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse)
    }
}

impl From<tree_sitter::QueryError> for ParseError {
    fn from(err: tree_sitter::QueryError) -> Self {
        Self::QueryCompile {
            offset: err.offset,
            message: err.message,
        }
    }
}
