//! Import extraction.
//!
//! Recognized forms:
//!
//! | Pattern | Example |
//! |---------|---------|
//! | Named | `import { Foo, Bar as Baz } from './path'` |
//! | Default | `import Foo from './path'` |
//! | Namespace | `import * as Foo from './path'` |
//! | Side-effect | `import './path'` |
//! | Type-only | `import type { Foo } from './path'` |
//! | Inline type | `import { type Foo } from './path'` |

use barrel_core::{ImportInfo, ImportSpecifier};
use tree_sitter::Node;

use crate::bindings::{LocalBinding, LocalTable};
use crate::syntax::{has_token, named_child_of_kind, node_span, node_text, unquote};

/// Extracts one `import_statement`, registering its bindings as locals.
///
/// Returns `None` for forms without a module specifier
/// (`import x = require(...)`).
pub(crate) fn extract_import<'s>(
    node: Node<'_>,
    source: &'s [u8],
    locals: &mut LocalTable<'s>,
) -> Option<ImportInfo> {
    let raw_specifier = node_text(node.child_by_field_name("source")?, source)?;
    let specifier = unquote(raw_specifier);

    let mut import = ImportInfo::new(specifier, node_span(node));
    import.quote = raw_specifier.chars().next().filter(|c| *c == '"').unwrap_or('\'');
    import.type_only = has_token(node, "type");

    let Some(clause) = named_child_of_kind(node, "import_clause") else {
        return Some(import);
    };

    let mut cursor = clause.walk();
    for part in clause.named_children(&mut cursor) {
        match part.kind() {
            "identifier" => {
                let Some(local) = node_text(part, source) else {
                    continue;
                };
                import.default_binding = Some(local.to_owned());
                locals.insert(
                    local,
                    LocalBinding::Imported {
                        specifier,
                        name: "default",
                        type_only: import.type_only,
                    },
                );
            }
            "namespace_import" => {
                if let Some(local) =
                    named_child_of_kind(part, "identifier").and_then(|n| node_text(n, source))
                {
                    import.namespace = Some(local.to_owned());
                    locals.insert(local, LocalBinding::Namespace);
                }
            }
            "named_imports" => {
                let mut spec_cursor = part.walk();
                for spec in part.named_children(&mut spec_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name) = spec
                        .child_by_field_name("name")
                        .and_then(|n| node_text(n, source))
                        .map(unquote)
                    else {
                        continue;
                    };
                    let alias = spec
                        .child_by_field_name("alias")
                        .and_then(|n| node_text(n, source));
                    let type_only = has_token(spec, "type");

                    locals.insert(
                        alias.unwrap_or(name),
                        LocalBinding::Imported {
                            specifier,
                            name,
                            type_only: type_only || import.type_only,
                        },
                    );
                    import.named.push(ImportSpecifier {
                        name: name.to_owned(),
                        alias: alias.map(str::to_owned),
                        type_only,
                    });
                }
            }
            _ => {}
        }
    }

    Some(import)
}
