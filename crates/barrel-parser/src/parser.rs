//! Parser management and module analysis.
//!
//! This module provides the [`SourceParser`] seam and its tree-sitter
//! implementation, [`TsParser`].

use barrel_core::{
    content_hash, FxHashSet, ModuleAnalysis, ParseStatus, ParseWarning, WarningKind,
};
use bumpalo::Bump;
use camino::Utf8Path;
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use crate::arena::StringInterner;
use crate::bindings::{declare, declare_top_level, LocalTable};
use crate::error::ParseError;
use crate::exports::extract_exports;
use crate::imports::extract_import;
use crate::queries::{module_query, CAPTURE_EXPORT, CAPTURE_IMPORT};
use crate::syntax::{first_error, node_line};

/// Grammar used for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Plain TypeScript (also used for `.js` and `.mts`).
    TypeScript,
    /// TypeScript with JSX (`.tsx`, `.jsx`).
    Tsx,
}

impl Dialect {
    /// Picks the grammar from a file extension.
    ///
    /// ```
    /// use barrel_parser::Dialect;
    /// use camino::Utf8Path;
    ///
    /// assert_eq!(Dialect::from_path(Utf8Path::new("a/App.tsx")), Dialect::Tsx);
    /// assert_eq!(Dialect::from_path(Utf8Path::new("a/api.ts")), Dialect::TypeScript);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some("tsx" | "jsx") => Self::Tsx,
            _ => Self::TypeScript,
        }
    }

    /// The tree-sitter language for this dialect.
    #[must_use]
    pub fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

/// Turns one module's text into a structured export list.
///
/// Everything downstream (registry, resolver, emitter) only depends on the
/// [`ModuleAnalysis`] this produces, so any parser able to recover the export
/// model can stand in for [`TsParser`].
pub trait SourceParser {
    /// Analyzes one module.
    ///
    /// Syntax errors are recovered and reported as warnings on the returned
    /// analysis.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] only when no analysis could be produced.
    fn analyze(&mut self, path: &Utf8Path, source: &str) -> Result<ModuleAnalysis, ParseError>;
}

/// tree-sitter backed [`SourceParser`].
///
/// Holds one parser per dialect. `TsParser` is `Send` but not `Sync`; the
/// scanner creates one per worker thread.
///
/// # Examples
///
/// ```
/// use barrel_core::ExportKind;
/// use barrel_parser::{SourceParser, TsParser};
/// use camino::Utf8Path;
///
/// let mut parser = TsParser::new()?;
/// let analysis = parser.analyze(
///     Utf8Path::new("/src/user.ts"),
///     "export interface User { id: number }\nexport const loadUser = () => null;\n",
/// )?;
///
/// assert_eq!(analysis.exports.len(), 2);
/// assert_eq!(analysis.exports[0].kind, ExportKind::TypeOnly);
/// assert_eq!(analysis.exports[1].kind, ExportKind::Named);
/// # Ok::<(), barrel_parser::ParseError>(())
/// ```
pub struct TsParser {
    typescript: Parser,
    tsx: Parser,
    arena: Bump,
}

impl TsParser {
    /// Creates a parser for both dialects.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if a grammar cannot be loaded.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            typescript: parser_for(Dialect::TypeScript)?,
            tsx: parser_for(Dialect::Tsx)?,
            arena: Bump::new(),
        })
    }

    /// Analyzes a module, allocating scratch data in `arena`.
    ///
    /// Used by the scanner with per-thread arenas; nothing in the returned
    /// analysis borrows from the arena.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Parse`] if tree-sitter produces no tree, or
    /// [`ParseError::QueryCompile`] if the module query cannot be compiled.
    pub fn analyze_in(
        &mut self,
        arena: &Bump,
        path: &Utf8Path,
        source: &str,
    ) -> Result<ModuleAnalysis, ParseError> {
        let dialect = Dialect::from_path(path);
        let parser = match dialect {
            Dialect::TypeScript => &mut self.typescript,
            Dialect::Tsx => &mut self.tsx,
        };
        let tree = parser.parse(source, None).ok_or(ParseError::Parse)?;
        let query = module_query(dialect)?;
        Ok(analyze_tree(&tree, source, path, query, arena))
    }
}

impl SourceParser for TsParser {
    fn analyze(&mut self, path: &Utf8Path, source: &str) -> Result<ModuleAnalysis, ParseError> {
        let mut arena = std::mem::take(&mut self.arena);
        let result = self.analyze_in(&arena, path, source);
        arena.reset();
        self.arena = arena;
        result
    }
}

impl std::fmt::Debug for TsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TsParser")
            .field("arena_bytes", &self.arena.allocated_bytes())
            .finish_non_exhaustive()
    }
}

fn parser_for(dialect: Dialect) -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .map_err(|_| ParseError::LanguageInit)?;
    Ok(parser)
}

fn analyze_tree(
    tree: &Tree,
    source: &str,
    path: &Utf8Path,
    query: &Query,
    arena: &Bump,
) -> ModuleAnalysis {
    let bytes = source.as_bytes();
    let root = tree.root_node();
    let mut analysis = ModuleAnalysis::new(path.to_owned(), content_hash(source));

    if let Some(error) = first_error(root) {
        analysis.status = ParseStatus::SyntaxWarning;
        analysis.warnings.push(
            ParseWarning::new(
                path.to_owned(),
                WarningKind::SyntaxError,
                "syntax error, exports may be incomplete",
            )
            .at_line(node_line(error)),
        );
    }

    let mut export_nodes: SmallVec<[Node<'_>; 16]> = SmallVec::new();
    let mut import_nodes: SmallVec<[Node<'_>; 16]> = SmallVec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, bytes);
    while let Some(match_) = matches.next() {
        for capture in match_.captures {
            match capture.index {
                CAPTURE_EXPORT => export_nodes.push(capture.node),
                CAPTURE_IMPORT => import_nodes.push(capture.node),
                _ => {}
            }
        }
    }

    let mut locals = LocalTable::default();
    declare_top_level(&mut locals, root, bytes);
    for node in &export_nodes {
        if let Some(decl) = node.child_by_field_name("declaration") {
            declare(&mut locals, decl, bytes);
        }
    }
    for &node in &import_nodes {
        if let Some(import) = extract_import(node, bytes, &mut locals) {
            analysis.imports.push(import);
        }
    }

    let mut interner = StringInterner::new(arena);
    let extraction = extract_exports(&export_nodes, bytes, &locals, &mut interner);

    let defaults: SmallVec<[u32; 2]> = extraction
        .exports
        .iter()
        .filter(|e| e.is_default())
        .map(|e| e.line)
        .collect();
    let drop_defaults = defaults.len() > 1;
    if drop_defaults {
        analysis.warnings.push(
            ParseWarning::new(
                path.to_owned(),
                WarningKind::DuplicateDefault,
                format!("{} default exports, default ignored", defaults.len()),
            )
            .at_line(defaults[1]),
        );
    }

    let mut seen = FxHashSet::default();
    for export in &extraction.exports {
        if drop_defaults && export.is_default() {
            continue;
        }
        // Overloads and merged declarations repeat a name.
        if seen.insert(export.name.as_str()) {
            analysis.exports.push(export.to_owned_declaration(path));
        }
    }
    analysis.default_statements = extraction.default_statements;
    analysis.star_reexports = extraction.star_reexports;
    analysis
}
