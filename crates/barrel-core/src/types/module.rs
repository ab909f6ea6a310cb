//! Per-file analysis results.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{
    ExportDeclaration, ExportKind, ImportInfo, ParseStatus, ParseWarning, SourceSpan,
};

/// A default-export statement and, for `export default <declaration>`, the
/// byte range of the declaration itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefaultStatement {
    /// The whole statement.
    pub span: SourceSpan,

    /// The inner declaration (`interface Foo {}` in `export default interface Foo {}`).
    pub declaration: Option<(usize, usize)>,
}

/// An `export * from '...'` statement awaiting resolution against siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StarReExport {
    /// Module specifier.
    pub specifier: String,

    /// `export type * from`.
    pub type_only: bool,

    /// 1-indexed line of the statement.
    pub line: u32,

    /// Every name the target exposes has been copied into the module's
    /// exports. Stays `false` for package specifiers and for targets that
    /// themselves forward an unexpanded star.
    #[serde(default)]
    pub expanded: bool,
}

impl StarReExport {
    /// Returns `true` if the statement may forward runtime values the module
    /// cannot list.
    #[must_use]
    pub const fn is_opaque_value(&self) -> bool {
        !self.type_only && !self.expanded
    }
}

/// Everything the analyzer learned about one module.
///
/// `exports` keeps declaration order. Defaults that were dropped because the
/// file declares more than one are absent from `exports` but their statements
/// remain in `default_statements`.
///
/// # Examples
///
/// ```
/// use barrel_core::{ExportDeclaration, ExportKind, ModuleAnalysis};
///
/// let mut analysis = ModuleAnalysis::new("/src/dto.ts".into(), 0);
/// analysis.exports.push(ExportDeclaration::new("UserDto", ExportKind::TypeOnly, "/src/dto.ts", 1));
/// assert!(analysis.is_type_only());
///
/// analysis.exports.push(ExportDeclaration::new("toDto", ExportKind::Named, "/src/dto.ts", 5));
/// assert!(!analysis.is_type_only());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAnalysis {
    /// Absolute path of the module.
    pub path: Utf8PathBuf,

    /// Content hash of the analyzed text.
    pub content_hash: u64,

    /// Parse status.
    pub status: ParseStatus,

    /// Exports in declaration order.
    pub exports: Vec<ExportDeclaration>,

    /// Every default-export statement found, valid or not.
    pub default_statements: SmallVec<[DefaultStatement; 1]>,

    /// Unexpanded `export * from` statements.
    pub star_reexports: Vec<StarReExport>,

    /// Import statements.
    pub imports: Vec<ImportInfo>,

    /// Recoverable anomalies.
    pub warnings: Vec<ParseWarning>,
}

impl ModuleAnalysis {
    /// Creates an empty analysis.
    #[must_use]
    pub fn new(path: Utf8PathBuf, content_hash: u64) -> Self {
        Self {
            path,
            content_hash,
            status: ParseStatus::Ok,
            exports: Vec::new(),
            default_statements: SmallVec::new(),
            star_reexports: Vec::new(),
            imports: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// File stem (`gamesService` for `gamesService.ts`).
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path.file_stem().unwrap_or_default()
    }

    /// Directory containing the module.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(Utf8Path::new(""))
    }

    /// Returns `true` if the module exports anything.
    #[must_use]
    pub fn has_exports(&self) -> bool {
        !self.exports.is_empty()
    }

    /// A module is type-only iff it exports something, every export is
    /// type-only and no `export *` may forward values it cannot list.
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        self.has_exports()
            && self.exports.iter().all(ExportDeclaration::is_type_only)
            && !self.star_reexports.iter().any(StarReExport::is_opaque_value)
    }

    /// The runtime default export, if any.
    #[must_use]
    pub fn value_default(&self) -> Option<&ExportDeclaration> {
        self.exports
            .iter()
            .find(|e| e.is_default() && e.kind == ExportKind::Default)
    }

    /// Exports other than `default`.
    pub fn named_exports(&self) -> impl Iterator<Item = &ExportDeclaration> {
        self.exports.iter().filter(|e| !e.is_default())
    }

    /// Looks up an export by name.
    #[must_use]
    pub fn export(&self, name: &str) -> Option<&ExportDeclaration> {
        self.exports.iter().find(|e| e.name == name)
    }

    /// Returns `true` if a type-only module still carries a default-export statement.
    #[must_use]
    pub fn has_type_only_violation(&self) -> bool {
        !self.default_statements.is_empty() && self.is_type_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_with(exports: &[(&str, ExportKind)]) -> ModuleAnalysis {
        let mut analysis = ModuleAnalysis::new("/src/a.ts".into(), 0);
        for (i, (name, kind)) in exports.iter().enumerate() {
            let line = u32::try_from(i).unwrap_or(0) + 1;
            analysis
                .exports
                .push(ExportDeclaration::new(*name, *kind, "/src/a.ts", line));
        }
        analysis
    }

    #[test]
    fn test_empty_module_is_not_type_only() {
        assert!(!analysis_with(&[]).is_type_only());
    }

    #[test]
    fn test_value_default_lookup() {
        let analysis = analysis_with(&[("default", ExportKind::Default), ("a", ExportKind::Named)]);
        assert!(analysis.value_default().is_some());
        assert_eq!(analysis.named_exports().count(), 1);

        let type_backed = analysis_with(&[("default", ExportKind::TypeOnly)]);
        assert!(type_backed.value_default().is_none());
        assert!(type_backed.is_type_only());
    }

    #[test]
    fn test_type_only_violation_needs_default_statement() {
        let mut analysis = analysis_with(&[("A", ExportKind::TypeOnly)]);
        assert!(!analysis.has_type_only_violation());
        analysis.default_statements.push(DefaultStatement {
            span: SourceSpan::new(3, 0, 30, 48),
            declaration: None,
        });
        assert!(analysis.has_type_only_violation());
        assert_eq!(analysis.stem(), "a");
    }

    #[test]
    fn test_unexpanded_value_star_is_not_type_only() {
        let mut analysis = analysis_with(&[("A", ExportKind::TypeOnly)]);
        analysis.default_statements.push(DefaultStatement {
            span: SourceSpan::new(2, 0, 20, 40),
            declaration: None,
        });
        analysis.star_reexports.push(StarReExport {
            specifier: "some-package".to_owned(),
            type_only: false,
            line: 3,
            expanded: false,
        });
        assert!(!analysis.is_type_only());
        assert!(!analysis.has_type_only_violation());

        analysis.star_reexports[0].type_only = true;
        assert!(analysis.is_type_only());

        analysis.star_reexports[0].type_only = false;
        analysis.star_reexports[0].expanded = true;
        assert!(analysis.is_type_only());
    }
}
