//! Small helpers over tree-sitter nodes.

use barrel_core::{BindingForm, SourceSpan};
use smallvec::SmallVec;
use tree_sitter::Node;

/// Gets the text content of a node.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    std::str::from_utf8(source.get(node.start_byte()..node.end_byte())?).ok()
}

/// Text of a named field of `node`.
pub(crate) fn field_text<'a>(node: Node<'_>, field: &str, source: &'a [u8]) -> Option<&'a str> {
    node_text(node.child_by_field_name(field)?, source)
}

/// 1-indexed line of a node's start.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn node_line(node: Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Converts a node's extent to a [`SourceSpan`].
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn node_span(node: Node<'_>) -> SourceSpan {
    let start = node.start_position();
    SourceSpan::new(
        start.row as u32 + 1,
        start.column as u32,
        node.start_byte(),
        node.end_byte(),
    )
}

/// Strips matching quotes from a string literal or module export name.
pub(crate) fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'\'' | b'"' | b'`'), Some(b'\'' | b'"' | b'`')) if text.len() >= 2 => {
            &text[1..text.len() - 1]
        }
        _ => text,
    }
}

/// Returns `true` if `node` has a direct anonymous child token of `kind`.
pub(crate) fn has_token(node: Node<'_>, kind: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == kind)
}

/// First named child of the given kind.
pub(crate) fn named_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|c| c.kind() == kind)
}

/// Finds the first error or missing node in document order.
pub(crate) fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: SmallVec<[Node<'_>; 16]> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Returns `true` for declaration kinds that only exist at the type level.
pub(crate) fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        "interface_declaration" | "type_alias_declaration" | "enum_declaration"
    )
}

/// Names bound by a declaration node, with their form.
///
/// Interfaces, type aliases and enums are type-only. Everything else that
/// binds a name (classes, functions, variables, namespaces) is a value.
pub(crate) fn declaration_bindings<'a>(
    decl: Node<'_>,
    source: &'a [u8],
) -> SmallVec<[(&'a str, BindingForm); 2]> {
    let mut out = SmallVec::new();
    match decl.kind() {
        kind if is_type_declaration(kind) => {
            if let Some(name) = field_text(decl, "name", source) {
                out.push((name, BindingForm::TypeOnly));
            }
        }
        "class_declaration"
        | "abstract_class_declaration"
        | "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "module"
        | "internal_module" => {
            if let Some(name_node) = decl.child_by_field_name("name") {
                // `declare module 'pkg'` names a package, not a binding.
                if name_node.kind() != "string" {
                    if let Some(name) = node_text(name_node, source) {
                        out.push((name, BindingForm::Value));
                    }
                }
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(pattern) = declarator.child_by_field_name("name") {
                    let mut names = SmallVec::<[&str; 4]>::new();
                    pattern_names(pattern, source, &mut names);
                    out.extend(names.into_iter().map(|n| (n, BindingForm::Value)));
                }
            }
        }
        "ambient_declaration" => {
            let mut cursor = decl.walk();
            for inner in decl.named_children(&mut cursor) {
                out.extend(declaration_bindings(inner, source));
            }
        }
        _ => {}
    }
    out
}

/// Collects identifiers bound by a destructuring pattern.
fn pattern_names<'a>(pattern: Node<'_>, source: &'a [u8], out: &mut SmallVec<[&'a str; 4]>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            if let Some(name) = node_text(pattern, source) {
                out.push(name);
            }
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                pattern_names(value, source, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                pattern_names(left, source, out);
            }
        }
        _ => {
            let mut cursor = pattern.walk();
            for child in pattern.named_children(&mut cursor) {
                pattern_names(child, source, out);
            }
        }
    }
}
