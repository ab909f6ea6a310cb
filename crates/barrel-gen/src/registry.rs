//! Pass-scoped export registry.
//!
//! Every name that can appear in a barrel is registered under the directory
//! whose barrel it would appear in (its *scope*): direct file exports under
//! the file's directory, and a finalized child barrel's surface under the
//! child's parent. Entries are only ever appended during a pass and the
//! registry is rebuilt from scratch for the next one.
//!
//! # Examples
//!
//! ```
//! use barrel_core::{ExportDeclaration, ExportKind};
//! use barrel_gen::ExportRegistry;
//! use camino::Utf8Path;
//!
//! let mut registry = ExportRegistry::new();
//! registry.register(&ExportDeclaration::new("ApiResponse", ExportKind::TypeOnly, "/src/api/games.ts", 1));
//! registry.register(&ExportDeclaration::new("ApiResponse", ExportKind::TypeOnly, "/src/api/historic.ts", 1));
//! registry.register(&ExportDeclaration::new("ApiResponse", ExportKind::TypeOnly, "/src/api/games.ts", 9));
//!
//! let conflicts = registry.conflicts_in(Utf8Path::new("/src/api"));
//! assert_eq!(conflicts.len(), 1);
//! assert_eq!(conflicts[0].1.len(), 2);
//! ```

use std::collections::BTreeMap;

use barrel_core::{
    BarrelShape, BindingForm, Contributor, ExportDeclaration, FxHashMap, FxHashSet, ModuleAnalysis,
};
use camino::{Utf8Path, Utf8PathBuf};

/// Names contributed to one directory's barrel.
///
/// Contributors of a name are kept in [`Contributor`] order (files first,
/// then by path), so iteration never depends on registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeExports {
    names: BTreeMap<String, BTreeMap<Contributor, BindingForm>>,
}

impl ScopeExports {
    fn insert(&mut self, name: &str, contributor: Contributor, form: BindingForm) {
        let contributors = self.names.entry(name.to_owned()).or_default();
        contributors
            .entry(contributor)
            .and_modify(|existing| *existing = existing.merge(form))
            .or_insert(form);
    }

    /// Every name with its contributors.
    pub fn names(&self) -> impl Iterator<Item = (&str, &BTreeMap<Contributor, BindingForm>)> {
        self.names.iter().map(|(name, c)| (name.as_str(), c))
    }

    /// Contributors of `name`.
    #[must_use]
    pub fn contributors_of(&self, name: &str) -> Option<&BTreeMap<Contributor, BindingForm>> {
        self.names.get(name)
    }

    /// Form of `name` as contributed by `contributor`.
    #[must_use]
    pub fn form_of(&self, name: &str, contributor: &Contributor) -> Option<BindingForm> {
        self.names.get(name)?.get(contributor).copied()
    }

    /// Names with more than one distinct contributor.
    pub fn conflicts(&self) -> impl Iterator<Item = (&str, Vec<&Contributor>)> {
        self.names
            .iter()
            .filter(|(_, contributors)| contributors.len() > 1)
            .map(|(name, contributors)| (name.as_str(), contributors.keys().collect()))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Project-wide registry of exported names, keyed by scope directory.
#[derive(Debug, Clone, Default)]
pub struct ExportRegistry {
    scopes: FxHashMap<Utf8PathBuf, ScopeExports>,
    declared: FxHashSet<String>,
}

impl ExportRegistry {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from every module's named exports.
    ///
    /// Default exports are never re-exported by name and are not registered.
    pub fn from_modules<'a>(modules: impl IntoIterator<Item = &'a ModuleAnalysis>) -> Self {
        let mut registry = Self::new();
        for module in modules {
            for export in module.named_exports() {
                registry.register(export);
            }
        }
        registry
    }

    /// Registers a file's export under the file's directory.
    ///
    /// Registering the same (name, file) pair twice keeps one entry whose
    /// form is type-only only if both registrations were.
    pub fn register(&mut self, declaration: &ExportDeclaration) {
        if declaration.is_default() {
            return;
        }
        let Some(scope) = declaration.source_file.parent() else {
            return;
        };
        self.declared.insert(declaration.name.clone());
        self.scopes.entry(scope.to_owned()).or_default().insert(
            &declaration.name,
            Contributor::file(declaration.source_file.clone()),
            declaration.form(),
        );
    }

    /// Registers a finalized child barrel under its parent directory.
    ///
    /// The child contributes its unqualified names and its aliases.
    pub fn register_barrel(&mut self, shape: &BarrelShape) {
        let Some(scope) = shape.directory.parent() else {
            return;
        };
        let contributor = Contributor::directory(shape.directory.clone());
        let exports = self.scopes.entry(scope.to_owned()).or_default();
        for (name, form) in shape.surface() {
            exports.insert(&name, contributor.clone(), form);
        }
    }

    /// Names contributed to `directory`'s barrel.
    #[must_use]
    pub fn scope(&self, directory: &Utf8Path) -> Option<&ScopeExports> {
        self.scopes.get(directory)
    }

    /// Names in `directory` with more than one distinct contributor.
    #[must_use]
    pub fn conflicts_in(&self, directory: &Utf8Path) -> Vec<(&str, Vec<&Contributor>)> {
        self.scope(directory)
            .map(|scope| scope.conflicts().collect())
            .unwrap_or_default()
    }

    /// Distinct names declared by source files anywhere in the tree.
    #[must_use]
    pub fn unique_names(&self) -> usize {
        self.declared.len()
    }
}

#[cfg(test)]
mod tests {
    use barrel_core::{AliasTarget, ExportKind};

    use super::*;

    fn declaration(name: &str, kind: ExportKind, file: &str) -> ExportDeclaration {
        ExportDeclaration::new(name, kind, file, 1)
    }

    #[test]
    fn test_same_file_never_conflicts_with_itself() {
        let mut registry = ExportRegistry::new();
        registry.register(&declaration("Game", ExportKind::TypeOnly, "/src/games.ts"));
        registry.register(&declaration("Game", ExportKind::Named, "/src/games.ts"));

        assert!(registry.conflicts_in(Utf8Path::new("/src")).is_empty());
        let scope = registry.scope(Utf8Path::new("/src")).expect("scope");
        let games = Contributor::file("/src/games.ts".into());
        assert_eq!(scope.form_of("Game", &games), Some(BindingForm::Value));
    }

    #[test]
    fn test_defaults_are_not_registered() {
        let mut registry = ExportRegistry::new();
        registry.register(&declaration("default", ExportKind::Default, "/src/a.ts"));
        assert!(registry.scope(Utf8Path::new("/src")).is_none());
        assert_eq!(registry.unique_names(), 0);
    }

    #[test]
    fn test_child_barrel_registers_under_parent() {
        let mut registry = ExportRegistry::new();
        registry.register(&declaration("Config", ExportKind::Named, "/src/config.ts"));

        let mut shape = BarrelShape::new("/src/settings".into());
        shape.unqualified.insert("Config".to_owned(), BindingForm::TypeOnly);
        shape.aliases.insert(
            "theme".to_owned(),
            AliasTarget {
                target: Contributor::file("/src/settings/theme.ts".into()),
                form: BindingForm::Value,
            },
        );
        registry.register_barrel(&shape);

        let conflicts = registry.conflicts_in(Utf8Path::new("/src"));
        assert_eq!(conflicts.len(), 1);
        let (name, contributors) = &conflicts[0];
        assert_eq!(*name, "Config");
        assert!(contributors[0].is_file());
        assert!(!contributors[1].is_file());

        let scope = registry.scope(Utf8Path::new("/src")).expect("scope");
        assert_eq!(scope.len(), 2);
        assert_eq!(registry.unique_names(), 1);
    }

    #[test]
    fn test_scopes_are_separate() {
        let registry = ExportRegistry::from_modules(&[
            {
                let mut m = ModuleAnalysis::new("/src/a/x.ts".into(), 0);
                m.exports.push(declaration("X", ExportKind::Named, "/src/a/x.ts"));
                m
            },
            {
                let mut m = ModuleAnalysis::new("/src/b/x.ts".into(), 0);
                m.exports.push(declaration("X", ExportKind::Named, "/src/b/x.ts"));
                m
            },
        ]);
        assert!(registry.conflicts_in(Utf8Path::new("/src/a")).is_empty());
        assert!(registry.conflicts_in(Utf8Path::new("/src/b")).is_empty());
        assert_eq!(registry.unique_names(), 1);
    }
}
