//! Top-level bindings of a module, used to classify local export lists.

use barrel_core::{BindingForm, FxHashMap};
use tree_sitter::Node;

use crate::syntax::declaration_bindings;

/// What a top-level name in a module refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocalBinding<'s> {
    /// Declared in this module.
    Declared(BindingForm),
    /// Imported by name (or as `default`) from another module.
    Imported {
        specifier: &'s str,
        name: &'s str,
        type_only: bool,
    },
    /// `import * as ns`.
    Namespace,
}

/// Top-level names of one module.
pub(crate) type LocalTable<'s> = FxHashMap<&'s str, LocalBinding<'s>>;

/// Adds every binding a declaration introduces.
///
/// A name declared both as a type and a value (a class and a merged
/// interface) is recorded as a value.
pub(crate) fn declare<'s>(table: &mut LocalTable<'s>, decl: Node<'_>, source: &'s [u8]) {
    for (name, form) in declaration_bindings(decl, source) {
        table
            .entry(name)
            .and_modify(|existing| {
                if let LocalBinding::Declared(prev) = existing {
                    *prev = prev.merge(form);
                }
            })
            .or_insert(LocalBinding::Declared(form));
    }
}

/// Adds the non-exported declarations that are direct children of `root`.
pub(crate) fn declare_top_level<'s>(table: &mut LocalTable<'s>, root: Node<'_>, source: &'s [u8]) {
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        // Exported declarations are added while walking export statements.
        if child.kind() != "export_statement" && child.kind() != "import_statement" {
            declare(table, child, source);
        }
    }
}

impl LocalBinding<'_> {
    /// Form of the binding, when it can be decided from this module alone.
    pub(crate) const fn known_form(&self) -> Option<BindingForm> {
        match self {
            Self::Declared(form) => Some(*form),
            Self::Imported { type_only: true, .. } => Some(BindingForm::TypeOnly),
            Self::Namespace => Some(BindingForm::Value),
            Self::Imported { .. } => None,
        }
    }
}
