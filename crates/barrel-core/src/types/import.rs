//! Import statements.
//!
//! Imports are only tracked so the self-healing pass can rewrite consumers
//! whose barrel changed shape; the analyzer never follows them.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::SourceSpan;

/// One `{ name as alias }` entry of a named import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// Name exported by the imported module.
    pub name: String,

    /// Local alias, if renamed.
    pub alias: Option<String>,

    /// Inline `type` modifier (`import { type A }`).
    pub type_only: bool,
}

impl ImportSpecifier {
    /// Creates a specifier with no alias.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    /// The name bound in the importing module.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn render(&self, out: &mut String) {
        if self.type_only {
            out.push_str("type ");
        }
        out.push_str(&self.name);
        if let Some(alias) = &self.alias {
            let _ = write!(out, " as {alias}");
        }
    }
}

/// A parsed `import` statement.
///
/// # Examples
///
/// ```
/// use barrel_core::{ImportInfo, ImportSpecifier, SourceSpan};
///
/// let mut import = ImportInfo::new("../models", SourceSpan::default());
/// import.named.push(ImportSpecifier::new("User"));
/// assert_eq!(import.render(), "import { User } from '../models';");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportInfo {
    /// Module specifier without quotes.
    pub specifier: String,

    /// Quote character used in the original statement.
    pub quote: char,

    /// Span of the whole statement, including the trailing semicolon.
    pub span: SourceSpan,

    /// Statement-level `import type`.
    pub type_only: bool,

    /// Default binding (`import Foo from ...`).
    pub default_binding: Option<String>,

    /// Namespace binding (`import * as ns from ...`).
    pub namespace: Option<String>,

    /// Named specifiers.
    pub named: Vec<ImportSpecifier>,
}

impl ImportInfo {
    /// Creates an import with no bindings (a side-effect import).
    #[must_use]
    pub fn new(specifier: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            specifier: specifier.into(),
            quote: '\'',
            span,
            type_only: false,
            default_binding: None,
            namespace: None,
            named: Vec::new(),
        }
    }

    /// Returns `true` for `./` and `../` specifiers.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.specifier == "."
            || self.specifier == ".."
            || self.specifier.starts_with("./")
            || self.specifier.starts_with("../")
    }

    /// Returns `true` if the statement binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_binding.is_none() && self.namespace.is_none() && self.named.is_empty()
    }

    /// Renders the statement back to source text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("import ");
        if self.type_only {
            out.push_str("type ");
        }

        let mut clauses = Vec::with_capacity(3);
        if let Some(default) = &self.default_binding {
            clauses.push(default.clone());
        }
        if let Some(ns) = &self.namespace {
            clauses.push(format!("* as {ns}"));
        }
        if !self.named.is_empty() {
            let mut list = String::from("{ ");
            for (i, spec) in self.named.iter().enumerate() {
                if i > 0 {
                    list.push_str(", ");
                }
                spec.render(&mut list);
            }
            list.push_str(" }");
            clauses.push(list);
        }

        if !clauses.is_empty() {
            out.push_str(&clauses.join(", "));
            out.push_str(" from ");
        }
        let _ = write!(out, "{q}{}{q};", self.specifier, q = self.quote);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mixed_import() {
        let mut import = ImportInfo::new("./api", SourceSpan::default());
        import.quote = '"';
        import.default_binding = Some("Api".to_owned());
        import.named.push(ImportSpecifier {
            name: "ApiResponse".to_owned(),
            alias: Some("Response".to_owned()),
            type_only: true,
        });
        import.named.push(ImportSpecifier::new("fetchAll"));
        assert_eq!(
            import.render(),
            r#"import Api, { type ApiResponse as Response, fetchAll } from "./api";"#
        );
    }

    #[test]
    fn test_render_type_import_and_side_effect() {
        let mut import = ImportInfo::new("../models", SourceSpan::default());
        assert_eq!(import.render(), "import '../models';");
        import.type_only = true;
        import.named.push(ImportSpecifier::new("User"));
        assert_eq!(import.render(), "import type { User } from '../models';");
    }

    #[test]
    fn test_is_relative() {
        assert!(ImportInfo::new("./a", SourceSpan::default()).is_relative());
        assert!(ImportInfo::new("..", SourceSpan::default()).is_relative());
        assert!(!ImportInfo::new("react", SourceSpan::default()).is_relative());
    }
}
