//! Generated barrel modules and the shape they expose.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::naming::relative_specifier;
use crate::types::{BindingForm, Contributor};

/// First line of every generated barrel.
///
/// A barrel-named file without this line is treated as hand-written and is
/// never overwritten or removed.
pub const GENERATED_MARKER: &str = "// @generated by barrelgen. Do not edit.";

/// A module a re-export statement points at: a direct file or a child barrel.
pub type ModuleTarget = Contributor;

/// The binding part of a re-export statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementForm {
    /// `export { a, b } from '...'`, names sorted.
    Named(Vec<String>),
    /// `export * as alias from '...'`.
    Namespace(String),
}

/// One re-export statement of a barrel.
///
/// # Examples
///
/// ```
/// use barrel_core::{Contributor, ReExportStatement};
/// use camino::Utf8Path;
///
/// let stmt = ReExportStatement::named(
///     Contributor::file("/src/api/types.ts".into()),
///     vec!["B".to_owned(), "A".to_owned()],
///     true,
/// );
/// assert_eq!(stmt.render(Utf8Path::new("/src/api")), "export type { A, B } from './types';");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReExportStatement {
    /// Module re-exported from.
    pub target: ModuleTarget,

    /// Bindings introduced.
    pub form: StatementForm,

    /// Uses the `export type` form.
    pub type_only: bool,
}

impl ReExportStatement {
    /// A named re-export. Names are sorted and deduplicated.
    #[must_use]
    pub fn named(target: ModuleTarget, mut names: Vec<String>, type_only: bool) -> Self {
        names.sort_unstable();
        names.dedup();
        Self {
            target,
            form: StatementForm::Named(names),
            type_only,
        }
    }

    /// A namespace re-export under `alias`.
    #[must_use]
    pub fn namespace(target: ModuleTarget, alias: impl Into<String>, type_only: bool) -> Self {
        Self {
            target,
            form: StatementForm::Namespace(alias.into()),
            type_only,
        }
    }

    /// External names this statement binds.
    #[must_use]
    pub fn bindings(&self) -> Vec<&str> {
        match &self.form {
            StatementForm::Named(names) => names.iter().map(String::as_str).collect(),
            StatementForm::Namespace(alias) => vec![alias.as_str()],
        }
    }

    /// Ordering rank within one target: value names, type names, namespaces.
    const fn rank(&self) -> u8 {
        match (&self.form, self.type_only) {
            (StatementForm::Named(_), false) => 1,
            (StatementForm::Named(_), true) => 2,
            (StatementForm::Namespace(_), _) => 3,
        }
    }

    /// Renders the statement relative to the barrel's directory.
    #[must_use]
    pub fn render(&self, barrel_dir: &Utf8Path) -> String {
        self.render_from(&relative_specifier(barrel_dir, &self.target.module_path()))
    }

    fn render_from(&self, specifier: &str) -> String {
        let keyword = if self.type_only { "export type" } else { "export" };
        match &self.form {
            StatementForm::Named(names) => {
                format!("{keyword} {{ {} }} from '{specifier}';", names.join(", "))
            }
            StatementForm::Namespace(alias) => {
                format!("{keyword} * as {alias} from '{specifier}';")
            }
        }
    }
}

/// The generated barrel of one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrelModule {
    /// Directory the barrel belongs to.
    pub directory: Utf8PathBuf,

    /// Re-export statements.
    pub statements: Vec<ReExportStatement>,

    /// Module whose runtime default export is forwarded as the barrel's default.
    pub default_forward: Option<ModuleTarget>,

    /// Child directories addressed through their barrel file, keyed by
    /// directory. Set when a sibling module claims the bare directory specifier.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entries: BTreeMap<Utf8PathBuf, Utf8PathBuf>,
}

impl BarrelModule {
    /// Creates an empty barrel.
    #[must_use]
    pub const fn new(directory: Utf8PathBuf) -> Self {
        Self {
            directory,
            statements: Vec::new(),
            default_forward: None,
            entries: BTreeMap::new(),
        }
    }

    /// Extension-less path `target` is imported through from this barrel.
    #[must_use]
    pub fn target_path(&self, target: &ModuleTarget) -> Utf8PathBuf {
        match self.entries.get(target.path()) {
            Some(entry) if !target.is_file() => entry.clone(),
            _ => target.module_path(),
        }
    }

    /// Returns `true` if the barrel would export nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.default_forward.is_none()
    }

    /// Every module the barrel references.
    pub fn targets(&self) -> impl Iterator<Item = &ModuleTarget> {
        self.statements
            .iter()
            .map(|s| &s.target)
            .chain(self.default_forward.as_ref())
    }

    /// Returns the first external name bound more than once, if any.
    ///
    /// ```
    /// use barrel_core::{BarrelModule, Contributor, ReExportStatement};
    ///
    /// let mut barrel = BarrelModule::new("/src".into());
    /// barrel.statements.push(ReExportStatement::named(
    ///     Contributor::file("/src/a.ts".into()), vec!["X".to_owned()], false));
    /// barrel.statements.push(ReExportStatement::named(
    ///     Contributor::file("/src/b.ts".into()), vec!["X".to_owned()], false));
    /// assert_eq!(barrel.duplicate_binding(), Some("X".to_owned()));
    /// ```
    #[must_use]
    pub fn duplicate_binding(&self) -> Option<String> {
        let mut seen = BTreeSet::new();
        if self.default_forward.is_some() {
            seen.insert("default");
        }
        self.statements
            .iter()
            .flat_map(ReExportStatement::bindings)
            .find(|name| !seen.insert(*name))
            .map(str::to_owned)
    }

    /// Renders the barrel file.
    ///
    /// Statements are ordered by target name, then default forward, value
    /// names, type names and namespaces.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines: Vec<((&str, &str, u8), String)> = self
            .statements
            .iter()
            .map(|s| {
                (
                    (s.target.name(), s.target.file_name(), s.rank()),
                    s.render_from(&relative_specifier(
                        &self.directory,
                        &self.target_path(&s.target),
                    )),
                )
            })
            .collect();
        if let Some(target) = &self.default_forward {
            let specifier = relative_specifier(&self.directory, &self.target_path(target));
            lines.push((
                (target.name(), target.file_name(), 0),
                format!("export {{ default }} from '{specifier}';"),
            ));
        }
        lines.sort();

        let mut out = String::with_capacity(64 * (lines.len() + 1));
        out.push_str(GENERATED_MARKER);
        out.push('\n');
        for (_, line) in lines {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}

/// Module reachable through a namespace alias of a barrel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasTarget {
    /// The aliased module.
    pub target: ModuleTarget,

    /// Form of the alias statement.
    pub form: BindingForm,
}

/// A name that is only reachable through an alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedBinding {
    /// Alias the name is reachable through.
    pub alias: String,

    /// Extension-less path of the declaring module (or child barrel directory).
    pub module: Utf8PathBuf,

    /// Form of the binding inside that module.
    pub form: BindingForm,
}

/// What a barrel exposes, as seen by importers and by the parent directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrelShape {
    /// Directory the barrel belongs to.
    pub directory: Utf8PathBuf,

    /// Unqualified names and their form.
    pub unqualified: BTreeMap<String, BindingForm>,

    /// Namespace aliases.
    pub aliases: BTreeMap<String, AliasTarget>,

    /// Names that lost a collision, mapped to where they can still be found.
    pub qualified: BTreeMap<String, Vec<QualifiedBinding>>,

    /// Whether a default export is forwarded.
    pub has_default: bool,
}

impl BarrelShape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new(directory: Utf8PathBuf) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }

    /// Returns `true` if the barrel exposes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unqualified.is_empty() && self.aliases.is_empty() && !self.has_default
    }

    /// Every name a parent barrel may re-export: unqualified names and aliases.
    #[must_use]
    pub fn surface(&self) -> BTreeMap<String, BindingForm> {
        let mut surface = self.unqualified.clone();
        for (alias, target) in &self.aliases {
            surface.insert(alias.clone(), target.form);
        }
        surface
    }

    /// Returns `true` if every exposed binding is type-only.
    #[must_use]
    pub fn is_type_only(&self) -> bool {
        !self.has_default
            && !(self.unqualified.is_empty() && self.aliases.is_empty())
            && self.unqualified.values().all(|f| f.is_type_only())
            && self.aliases.values().all(|a| a.form.is_type_only())
    }
}
