//! Export extraction from `export_statement` nodes.
//!
//! # Export Forms
//!
//! | Form | Result |
//! |------|--------|
//! | `export interface A {}` / `export type A = ..` / `export enum A {}` | `A`, type-only |
//! | `export class A {}` / `export function a() {}` / `export const a = ..` | `a`, named |
//! | `export declare const a: T` | `a`, named |
//! | `export default <declaration or expression>` | `default` |
//! | `export { a, b as c }` | classified against the module's own bindings |
//! | `export type { A }` / `export { type A }` | type-only |
//! | `export { a } from './x'` | named, re-export |
//! | `export * as ns from './x'` | `ns`, re-export of the whole module |
//! | `export * from './x'` | recorded for expansion against siblings |
//!
//! `export = x` and `export as namespace X` have no ES module binding and are
//! ignored.

use barrel_core::{BindingForm, DefaultStatement, ExportKind, StarReExport};
use bumpalo::collections::Vec as BumpVec;
use smallvec::SmallVec;
use tree_sitter::Node;

use crate::arena::{ArenaStr, BumpExport, StringInterner};
use crate::bindings::{LocalBinding, LocalTable};
use crate::syntax::{
    declaration_bindings, field_text, has_token, is_type_declaration, named_child_of_kind,
    node_line, node_span, node_text, unquote,
};

/// Raw extraction output for one module.
pub(crate) struct Extraction<'bump> {
    pub(crate) exports: BumpVec<'bump, BumpExport<'bump>>,
    pub(crate) default_statements: SmallVec<[DefaultStatement; 1]>,
    pub(crate) star_reexports: Vec<StarReExport>,
}

/// Extracts exports from every top-level `export_statement`.
///
/// `locals` must already hold the module's declarations and imports.
pub(crate) fn extract_exports<'bump>(
    statements: &[Node<'_>],
    source: &[u8],
    locals: &LocalTable<'_>,
    interner: &mut StringInterner<'bump>,
) -> Extraction<'bump> {
    let mut extraction = Extraction {
        exports: BumpVec::with_capacity_in(statements.len(), interner.arena()),
        default_statements: SmallVec::new(),
        star_reexports: Vec::new(),
    };

    for &statement in statements {
        extract_statement(statement, source, locals, interner, &mut extraction);
    }
    extraction
}

fn extract_statement<'bump>(
    node: Node<'_>,
    source: &[u8],
    locals: &LocalTable<'_>,
    interner: &mut StringInterner<'bump>,
    out: &mut Extraction<'bump>,
) {
    let line = node_line(node);
    let type_keyword = has_token(node, "type");
    let is_default = has_token(node, "default");
    let from = node
        .child_by_field_name("source")
        .and_then(|n| node_text(n, source))
        .map(|s| interner.intern(unquote(s)));

    if let Some(decl) = node.child_by_field_name("declaration") {
        if is_default {
            out.default_statements.push(DefaultStatement {
                span: node_span(node),
                declaration: Some((decl.start_byte(), decl.end_byte())),
            });
            let kind = if is_type_declaration(decl.kind()) {
                ExportKind::TypeOnly
            } else {
                ExportKind::Default
            };
            let original = field_text(decl, "name", source).map(|n| interner.alloc(n));
            out.exports.push(BumpExport {
                name: interner.intern("default"),
                kind,
                original_name: original,
                reexport_from: None,
                line,
            });
        } else {
            for (name, form) in declaration_bindings(decl, source) {
                out.exports.push(BumpExport {
                    name: interner.alloc(name),
                    kind: named_kind(form),
                    original_name: None,
                    reexport_from: None,
                    line,
                });
            }
        }
        return;
    }

    if is_default {
        out.default_statements.push(DefaultStatement {
            span: node_span(node),
            declaration: None,
        });
        let export = match node.child_by_field_name("value") {
            Some(value) if value.kind() == "identifier" => {
                let ident = node_text(value, source).unwrap_or_default();
                default_of_identifier(ident, locals, interner, line)
            }
            value => BumpExport {
                name: interner.intern("default"),
                kind: ExportKind::Default,
                original_name: value
                    .and_then(|v| field_text(v, "name", source))
                    .map(|n| interner.alloc(n)),
                reexport_from: None,
                line,
            },
        };
        out.exports.push(export);
        return;
    }

    if let Some(clause) = named_child_of_kind(node, "export_clause") {
        let mut cursor = clause.walk();
        for spec in clause.named_children(&mut cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(name) = field_text(spec, "name", source).map(unquote) else {
                continue;
            };
            let alias = field_text(spec, "alias", source).map(unquote);
            let type_only = type_keyword || has_token(spec, "type");
            let export = clause_export(name, alias, type_only, from, locals, interner, line);
            out.exports.push(export);
        }
        return;
    }

    if let Some(namespace) = named_child_of_kind(node, "namespace_export") {
        let mut cursor = namespace.walk();
        let alias = namespace
            .named_children(&mut cursor)
            .last()
            .and_then(|n| node_text(n, source))
            .map(unquote);
        if let (Some(alias), Some(from)) = (alias, from) {
            out.exports.push(BumpExport {
                name: interner.alloc(alias),
                kind: if type_keyword {
                    ExportKind::TypeOnly
                } else {
                    ExportKind::Named
                },
                original_name: Some(interner.intern("*")),
                reexport_from: Some(from),
                line,
            });
        }
        return;
    }

    if has_token(node, "*") {
        if let Some(from) = from {
            out.star_reexports.push(StarReExport {
                specifier: from.as_str().to_owned(),
                type_only: type_keyword,
                line,
                expanded: false,
            });
        }
    }
}

const fn named_kind(form: BindingForm) -> ExportKind {
    match form {
        BindingForm::Value => ExportKind::Named,
        BindingForm::TypeOnly => ExportKind::TypeOnly,
    }
}

/// Classifies `export default <identifier>;`.
///
/// Identifiers bound to a type, a type import, or nothing in the module are
/// type-backed defaults.
fn default_of_identifier<'bump>(
    ident: &str,
    locals: &LocalTable<'_>,
    interner: &mut StringInterner<'bump>,
    line: u32,
) -> BumpExport<'bump> {
    let mut export = BumpExport {
        name: interner.intern("default"),
        kind: ExportKind::TypeOnly,
        original_name: Some(interner.alloc(ident)),
        reexport_from: None,
        line,
    };
    match locals.get(ident) {
        Some(LocalBinding::Declared(BindingForm::Value) | LocalBinding::Namespace) => {
            export.kind = ExportKind::Default;
        }
        Some(LocalBinding::Imported {
            specifier,
            name,
            type_only,
        }) => {
            if !*type_only {
                export.kind = ExportKind::Default;
            }
            export.original_name = Some(interner.alloc(name));
            export.reexport_from = Some(interner.intern(specifier));
        }
        Some(LocalBinding::Declared(BindingForm::TypeOnly)) | None => {}
    }
    export
}

/// Classifies one specifier of an export list.
fn clause_export<'bump>(
    name: &str,
    alias: Option<&str>,
    type_only: bool,
    from: Option<ArenaStr<'bump>>,
    locals: &LocalTable<'_>,
    interner: &mut StringInterner<'bump>,
    line: u32,
) -> BumpExport<'bump> {
    let exported = alias.unwrap_or(name);
    let mut export = BumpExport {
        name: interner.alloc(exported),
        kind: if type_only {
            ExportKind::TypeOnly
        } else {
            ExportKind::Named
        },
        original_name: alias.map(|_| interner.alloc(name)),
        reexport_from: from,
        line,
    };

    if from.is_none() && !type_only {
        match locals.get(name) {
            Some(LocalBinding::Imported {
                specifier,
                name: imported,
                type_only: imported_type,
            }) => {
                if *imported_type {
                    export.kind = ExportKind::TypeOnly;
                }
                export.original_name = Some(interner.alloc(imported));
                export.reexport_from = Some(interner.intern(specifier));
            }
            Some(binding) => {
                if binding.known_form() == Some(BindingForm::TypeOnly) {
                    export.kind = ExportKind::TypeOnly;
                }
            }
            None => {}
        }
    }

    if exported == "default" && export.kind == ExportKind::Named {
        export.kind = ExportKind::Default;
    }
    export
}
