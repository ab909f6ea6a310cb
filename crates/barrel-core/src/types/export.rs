//! Export declarations.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// How a binding is visible to importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// The module's runtime default export.
    Default,
    /// A named runtime binding.
    Named,
    /// A binding that exists only at the type level.
    TypeOnly,
}

/// Whether a re-exported binding is a runtime value or erased at compile time.
///
/// # Examples
///
/// ```
/// use barrel_core::BindingForm;
///
/// assert_eq!(BindingForm::TypeOnly.merge(BindingForm::TypeOnly), BindingForm::TypeOnly);
/// assert_eq!(BindingForm::TypeOnly.merge(BindingForm::Value), BindingForm::Value);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingForm {
    /// A runtime value (possibly also a type, like a class).
    Value,
    /// Type-level only.
    TypeOnly,
}

impl BindingForm {
    /// Combines two forms: type-only only if both are.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::TypeOnly, Self::TypeOnly) => Self::TypeOnly,
            _ => Self::Value,
        }
    }

    /// Returns `true` for [`BindingForm::TypeOnly`].
    #[must_use]
    pub const fn is_type_only(self) -> bool {
        matches!(self, Self::TypeOnly)
    }
}

/// A single binding a module exposes to importers.
///
/// Immutable once produced for a given version of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportDeclaration {
    /// Name visible to importers (`default` for default exports).
    pub name: String,

    /// Export kind.
    pub kind: ExportKind,

    /// Local name when the export renames a binding (`export { a as b }`),
    /// or `*` for a namespace re-export (`export * as ns from ...`).
    pub original_name: Option<String>,

    /// File that contains the export statement.
    pub source_file: Utf8PathBuf,

    /// 1-indexed line of the export statement.
    pub line: u32,

    /// Module specifier for re-exports (`export { a } from './x'`).
    pub reexport_from: Option<String>,
}

impl ExportDeclaration {
    /// Creates a declaration with no rename and no re-export source.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: ExportKind,
        source_file: impl Into<Utf8PathBuf>,
        line: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            original_name: None,
            source_file: source_file.into(),
            line,
            reexport_from: None,
        }
    }

    /// Sets the original (local) name.
    #[must_use]
    pub fn with_original_name(mut self, original: impl Into<String>) -> Self {
        self.original_name = Some(original.into());
        self
    }

    /// Sets the re-export source specifier.
    #[must_use]
    pub fn with_reexport_from(mut self, specifier: impl Into<String>) -> Self {
        self.reexport_from = Some(specifier.into());
        self
    }

    /// Returns `true` if this is a type-only export.
    #[inline]
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        self.kind == ExportKind::TypeOnly
    }

    /// Returns `true` if this binds the `default` name.
    #[inline]
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == "default"
    }

    /// The binding form a re-export of this declaration must use.
    #[inline]
    #[must_use]
    pub fn form(&self) -> BindingForm {
        if self.is_type_only() {
            BindingForm::TypeOnly
        } else {
            BindingForm::Value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_form() {
        let value = ExportDeclaration::new("Game", ExportKind::Named, "/src/game.ts", 3);
        let ty = ExportDeclaration::new("GameDto", ExportKind::TypeOnly, "/src/game.ts", 7);
        assert_eq!(value.form(), BindingForm::Value);
        assert_eq!(ty.form(), BindingForm::TypeOnly);
        assert!(!value.is_default());
    }

    #[test]
    fn test_type_backed_default_is_type_only() {
        let decl = ExportDeclaration::new("default", ExportKind::TypeOnly, "/src/a.ts", 1)
            .with_original_name("Props");
        assert!(decl.is_default());
        assert!(decl.is_type_only());
        assert_eq!(decl.original_name.as_deref(), Some("Props"));
    }
}
