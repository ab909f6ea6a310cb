//! Settles re-exports once every module in the tree is analyzed.
//!
//! A single file cannot tell whether `export { A } from './a'` forwards a
//! type or a value, or which names `export * from './a'` brings in. This
//! module folds the parallel results sequentially in three steps:
//!
//! 1. Star re-exports are expanded until no module gains a name.
//! 2. Stars are flagged expanded unless they lead, directly or through
//!    other stars, to a specifier outside the analyzed tree.
//! 3. Re-export kinds are refined from their targets until nothing changes.
//!
//! Classification waits for the first two steps because a namespace
//! re-export (`export * as ns`) is type-only only if its target's full
//! surface is. Each step only moves in one direction (names are added,
//! flags are cleared, kinds move towards type-only), so each terminates.

use std::collections::BTreeMap;

use barrel_core::naming::{module_path, resolve_specifier};
use barrel_core::{
    ExportDeclaration, ExportKind, FxHashMap, FxHashSet, ModuleAnalysis, ParseWarning, WarningKind,
};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// Maps module specifiers to analyzed files.
struct ModuleIndex {
    by_path: FxHashMap<Utf8PathBuf, Utf8PathBuf>,
}

impl ModuleIndex {
    fn new<'a>(paths: impl Iterator<Item = &'a Utf8PathBuf>) -> Self {
        let mut by_path = FxHashMap::default();
        for path in paths {
            by_path.insert(path.clone(), path.clone());
            by_path.entry(module_path(path)).or_insert_with(|| path.clone());
        }
        Self { by_path }
    }

    /// Resolves `specifier` written in a module inside `from_dir`.
    ///
    /// Both extension-less (`./a`) and ESM-style (`./a.js`) specifiers match
    /// `a.ts`.
    fn resolve(&self, from_dir: &Utf8Path, specifier: &str) -> Option<&Utf8Path> {
        let resolved = resolve_specifier(from_dir, specifier)?;
        self.by_path
            .get(&resolved)
            .or_else(|| self.by_path.get(&module_path(&resolved)))
            .map(Utf8PathBuf::as_path)
    }

    /// The analyzed module `specifier` points at from `module`, if it is
    /// another module.
    fn target<'m>(
        &self,
        modules: &'m BTreeMap<Utf8PathBuf, ModuleAnalysis>,
        module: &ModuleAnalysis,
        specifier: &str,
    ) -> Option<&'m ModuleAnalysis> {
        self.resolve(module.directory(), specifier)
            .filter(|target| *target != module.path.as_path())
            .and_then(|target| modules.get(target))
    }
}

/// Refines and expands re-exports across `modules`.
///
/// Returns a warning for every `export *` whose target is not an analyzed
/// module.
pub fn settle_reexports(modules: &mut BTreeMap<Utf8PathBuf, ModuleAnalysis>) -> Vec<ParseWarning> {
    let index = ModuleIndex::new(modules.keys());
    let limit = modules.len() + 1;

    let rounds = fold(
        modules,
        limit,
        |modules| expansion_round(modules, &index),
        |module, export| module.exports.push(export),
    );
    debug!(rounds, "Star re-exports expanded");

    flag_expanded_stars(modules, &index);

    let rounds = fold(
        modules,
        limit,
        |modules| classification_round(modules, &index),
        |module, position| {
            if let Some(export) = module.exports.get_mut(position) {
                export.kind = ExportKind::TypeOnly;
            }
        },
    );
    debug!(rounds, "Re-export kinds settled");

    unresolved_stars(modules, &index)
}

/// Plans and applies rounds until one plans nothing or `limit` is reached.
/// Returns the number of rounds that changed something.
fn fold<U>(
    modules: &mut BTreeMap<Utf8PathBuf, ModuleAnalysis>,
    limit: usize,
    plan: impl Fn(&BTreeMap<Utf8PathBuf, ModuleAnalysis>) -> Vec<(Utf8PathBuf, U)>,
    apply: impl Fn(&mut ModuleAnalysis, U),
) -> usize {
    for round in 0..limit {
        let updates = plan(modules);
        if updates.is_empty() {
            return round;
        }
        for (path, update) in updates {
            if let Some(module) = modules.get_mut(&path) {
                apply(module, update);
            }
        }
    }
    limit
}

/// Names each module gains from its `export *` statements this round.
fn expansion_round(
    modules: &BTreeMap<Utf8PathBuf, ModuleAnalysis>,
    index: &ModuleIndex,
) -> Vec<(Utf8PathBuf, ExportDeclaration)> {
    let mut updates = Vec::new();

    for (path, module) in modules {
        let mut added: FxHashSet<&str> = FxHashSet::default();
        for star in &module.star_reexports {
            let Some(target) = index.target(modules, module, &star.specifier) else {
                continue;
            };
            for export in target.named_exports() {
                if module.export(&export.name).is_some() || !added.insert(&export.name) {
                    continue;
                }
                let kind = if star.type_only || export.is_type_only() {
                    ExportKind::TypeOnly
                } else {
                    ExportKind::Named
                };
                let declaration =
                    ExportDeclaration::new(export.name.clone(), kind, path.clone(), star.line)
                        .with_original_name(export.name.clone())
                        .with_reexport_from(star.specifier.clone());
                updates.push((path.clone(), declaration));
            }
        }
    }

    updates
}

/// Sets `expanded` on every star whose target is analyzed, then clears it
/// again wherever the target forwards a value star that is not expanded,
/// until no flag changes. Cycles of resolvable stars stay expanded.
fn flag_expanded_stars(modules: &mut BTreeMap<Utf8PathBuf, ModuleAnalysis>, index: &ModuleIndex) {
    let mut resolvable = Vec::new();
    for module in modules.values() {
        for (position, star) in module.star_reexports.iter().enumerate() {
            if index.target(modules, module, &star.specifier).is_some() {
                resolvable.push((module.path.clone(), position));
            }
        }
    }
    for module in modules.values_mut() {
        for star in &mut module.star_reexports {
            star.expanded = false;
        }
    }
    for (path, position) in resolvable {
        if let Some(star) = modules
            .get_mut(&path)
            .and_then(|module| module.star_reexports.get_mut(position))
        {
            star.expanded = true;
        }
    }

    let limit = modules.len() + 1;
    fold(
        modules,
        limit,
        |modules| {
            let mut cleared = Vec::new();
            for (path, module) in modules {
                for (position, star) in module.star_reexports.iter().enumerate() {
                    let leaks = star.expanded
                        && index
                            .target(modules, module, &star.specifier)
                            .is_some_and(|target| {
                                target.star_reexports.iter().any(|s| s.is_opaque_value())
                            });
                    if leaks {
                        cleared.push((path.clone(), position));
                    }
                }
            }
            cleared
        },
        |module, position| {
            if let Some(star) = module.star_reexports.get_mut(position) {
                star.expanded = false;
            }
        },
    );
}

/// Re-exports whose target turned out to be type-only this round.
fn classification_round(
    modules: &BTreeMap<Utf8PathBuf, ModuleAnalysis>,
    index: &ModuleIndex,
) -> Vec<(Utf8PathBuf, usize)> {
    let mut updates = Vec::new();

    for (path, module) in modules {
        for (position, export) in module.exports.iter().enumerate() {
            if export.kind == ExportKind::TypeOnly {
                continue;
            }
            let Some(target) = export
                .reexport_from
                .as_deref()
                .and_then(|spec| index.target(modules, module, spec))
            else {
                continue;
            };
            let original = export.original_name.as_deref().unwrap_or(&export.name);
            let type_only = if original == "*" {
                target.is_type_only()
            } else {
                target.export(original).is_some_and(ExportDeclaration::is_type_only)
            };
            if type_only {
                updates.push((path.clone(), position));
            }
        }
    }

    updates
}

fn unresolved_stars(
    modules: &BTreeMap<Utf8PathBuf, ModuleAnalysis>,
    index: &ModuleIndex,
) -> Vec<ParseWarning> {
    modules
        .values()
        .flat_map(|module| {
            module
                .star_reexports
                .iter()
                .filter(|star| index.resolve(module.directory(), &star.specifier).is_none())
                .map(|star| {
                    ParseWarning::new(
                        module.path.clone(),
                        WarningKind::UnresolvedReExport,
                        format!("cannot expand `export *` from '{}'", star.specifier),
                    )
                    .at_line(star.line)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use barrel_core::StarReExport;

    use super::*;

    fn module(path: &str, exports: &[(&str, ExportKind)]) -> ModuleAnalysis {
        let mut analysis = ModuleAnalysis::new(path.into(), 0);
        for (name, kind) in exports {
            analysis
                .exports
                .push(ExportDeclaration::new(*name, *kind, path, 1));
        }
        analysis
    }

    fn tree(modules: Vec<ModuleAnalysis>) -> BTreeMap<Utf8PathBuf, ModuleAnalysis> {
        modules.into_iter().map(|m| (m.path.clone(), m)).collect()
    }

    #[test]
    fn test_reexport_of_type_becomes_type_only() {
        let mut facade = module("/src/facade.ts", &[]);
        facade.exports.push(
            ExportDeclaration::new("User", ExportKind::Named, "/src/facade.ts", 1)
                .with_reexport_from("./user"),
        );
        let mut modules = tree(vec![
            module("/src/user.ts", &[("User", ExportKind::TypeOnly)]),
            facade,
        ]);

        let warnings = settle_reexports(&mut modules);

        assert!(warnings.is_empty());
        assert!(modules[Utf8Path::new("/src/facade.ts")].is_type_only());
    }

    #[test]
    fn test_star_expansion_follows_chain() {
        let mut outer = module("/src/outer.ts", &[]);
        outer.star_reexports.push(StarReExport {
            specifier: "./inner.js".to_owned(),
            type_only: false,
            line: 1,
            expanded: false,
        });
        let mut inner = module("/src/inner.ts", &[("local", ExportKind::Named)]);
        inner.star_reexports.push(StarReExport {
            specifier: "./leaf".to_owned(),
            type_only: false,
            line: 2,
            expanded: false,
        });
        let leaf = module(
            "/src/leaf.ts",
            &[("Leaf", ExportKind::TypeOnly), ("default", ExportKind::Default)],
        );
        let mut modules = tree(vec![outer, inner, leaf]);

        let _ = settle_reexports(&mut modules);

        let outer = &modules[Utf8Path::new("/src/outer.ts")];
        let names: Vec<&str> = outer.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"local"));
        assert!(names.contains(&"Leaf"));
        assert_eq!(outer.export("Leaf").map(|e| e.kind), Some(ExportKind::TypeOnly));
        assert!(outer.export("default").is_none());
    }

    #[test]
    fn test_local_export_shadows_star() {
        let mut a = module("/src/a.ts", &[("shared", ExportKind::TypeOnly)]);
        a.star_reexports.push(StarReExport {
            specifier: "./b".to_owned(),
            type_only: false,
            line: 3,
            expanded: false,
        });
        let mut modules = tree(vec![a, module("/src/b.ts", &[("shared", ExportKind::Named)])]);

        let _ = settle_reexports(&mut modules);

        let a = &modules[Utf8Path::new("/src/a.ts")];
        assert_eq!(a.exports.len(), 1);
        assert_eq!(a.exports[0].kind, ExportKind::TypeOnly);
    }

    #[test]
    fn test_unresolved_star_warns() {
        let mut a = module("/src/a.ts", &[]);
        a.star_reexports.push(StarReExport {
            specifier: "some-package".to_owned(),
            type_only: false,
            line: 4,
            expanded: false,
        });
        let mut modules = tree(vec![a]);

        let warnings = settle_reexports(&mut modules);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnresolvedReExport);
        assert_eq!(warnings[0].line, Some(4));
    }

    fn star(specifier: &str, line: u32) -> StarReExport {
        StarReExport {
            specifier: specifier.to_owned(),
            type_only: false,
            line,
            expanded: false,
        }
    }

    fn namespace(path: &str, alias: &str, from: &str) -> ExportDeclaration {
        ExportDeclaration::new(alias, ExportKind::Named, path, 1)
            .with_original_name("*")
            .with_reexport_from(from)
    }

    #[test]
    fn test_namespace_over_star_chain_keeps_values() {
        let mut a = module("/lib/a.ts", &[("A", ExportKind::TypeOnly)]);
        a.star_reexports.push(star("./values", 2));
        let mut b = module("/lib/b.ts", &[]);
        b.exports.push(namespace("/lib/b.ts", "ns", "./a"));
        let mut modules = tree(vec![
            module("/lib/values.ts", &[("v", ExportKind::Named)]),
            a,
            b,
        ]);

        let _ = settle_reexports(&mut modules);

        let a = &modules[Utf8Path::new("/lib/a.ts")];
        assert_eq!(a.export("v").map(|e| e.kind), Some(ExportKind::Named));
        assert!(!a.is_type_only());
        let b = &modules[Utf8Path::new("/lib/b.ts")];
        assert_eq!(b.export("ns").map(|e| e.kind), Some(ExportKind::Named));
    }

    #[test]
    fn test_namespace_of_types_only_is_type_only() {
        let mut a = module("/lib/a.ts", &[("A", ExportKind::TypeOnly)]);
        a.star_reexports.push(star("./types", 2));
        let mut b = module("/lib/b.ts", &[]);
        b.exports.push(namespace("/lib/b.ts", "ns", "./a"));
        let mut modules = tree(vec![
            module("/lib/types.ts", &[("T", ExportKind::TypeOnly)]),
            a,
            b,
        ]);

        let _ = settle_reexports(&mut modules);

        assert!(modules[Utf8Path::new("/lib/a.ts")].star_reexports[0].expanded);
        let b = &modules[Utf8Path::new("/lib/b.ts")];
        assert_eq!(b.export("ns").map(|e| e.kind), Some(ExportKind::TypeOnly));
    }

    #[test]
    fn test_package_star_keeps_chain_unexpanded() {
        let mut inner = module("/src/inner.ts", &[("Props", ExportKind::TypeOnly)]);
        inner.star_reexports.push(star("some-package", 2));
        let mut outer = module("/src/outer.ts", &[("Config", ExportKind::TypeOnly)]);
        outer.star_reexports.push(star("./inner", 3));
        let mut modules = tree(vec![inner, outer]);

        let warnings = settle_reexports(&mut modules);

        assert_eq!(warnings.len(), 1);
        let inner = &modules[Utf8Path::new("/src/inner.ts")];
        let outer = &modules[Utf8Path::new("/src/outer.ts")];
        assert!(!inner.star_reexports[0].expanded);
        assert!(!outer.star_reexports[0].expanded);
        assert!(!inner.is_type_only());
        assert!(!outer.is_type_only());
        assert_eq!(outer.export("Props").map(|e| e.kind), Some(ExportKind::TypeOnly));
    }

    #[test]
    fn test_star_cycle_stays_expanded() {
        let mut a = module("/src/a.ts", &[("A", ExportKind::TypeOnly)]);
        a.star_reexports.push(star("./b", 1));
        let mut b = module("/src/b.ts", &[("B", ExportKind::TypeOnly)]);
        b.star_reexports.push(star("./a", 1));
        let mut modules = tree(vec![a, b]);

        let warnings = settle_reexports(&mut modules);

        assert!(warnings.is_empty());
        assert!(modules.values().all(ModuleAnalysis::is_type_only));
        assert_eq!(modules[Utf8Path::new("/src/a.ts")].exports.len(), 2);
    }
}
