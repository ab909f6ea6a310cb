//! Name collisions and their resolution.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::naming::module_path;

/// Policy chosen for one colliding name (or one contributor of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Re-exported unqualified as a runtime value.
    Direct,
    /// Re-exported through a namespace alias of the contributor.
    QualifiedAlias,
    /// Re-exported unqualified with the type-only form.
    TypeOnlyDirect,
    /// Not re-exported from this directory.
    Excluded,
}

impl ResolutionStrategy {
    /// Short, stable label used in console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::QualifiedAlias => "qualified-alias",
            Self::TypeOnlyDirect => "type-only-direct",
            Self::Excluded => "excluded",
        }
    }
}

/// Whether a contributor is a direct file or a child directory's barrel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorKind {
    /// A source file directly inside the directory.
    File,
    /// An immediate subdirectory, through its finalized barrel.
    Directory,
}

/// A file or subdirectory contributing names to a directory's barrel.
///
/// # Examples
///
/// ```
/// use barrel_core::Contributor;
///
/// let file = Contributor::file("/src/api/gamesService.ts".into());
/// assert_eq!(file.name(), "gamesService");
///
/// let dir = Contributor::directory("/src/api/models".into());
/// assert_eq!(dir.name(), "models");
/// assert!(file < dir);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Contributor {
    /// Contributor kind. Files sort before directories.
    pub kind: ContributorKind,

    /// Absolute path of the file or directory.
    pub path: Utf8PathBuf,
}

impl Contributor {
    /// A direct file contributor.
    #[must_use]
    pub const fn file(path: Utf8PathBuf) -> Self {
        Self {
            kind: ContributorKind::File,
            path,
        }
    }

    /// A subdirectory contributor.
    #[must_use]
    pub const fn directory(path: Utf8PathBuf) -> Self {
        Self {
            kind: ContributorKind::Directory,
            path,
        }
    }

    /// Returns `true` for direct files.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == ContributorKind::File
    }

    /// File stem or directory name, used for priority matching and aliases.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.kind {
            ContributorKind::File => self.path.file_stem().unwrap_or_default(),
            ContributorKind::Directory => self.path.file_name().unwrap_or_default(),
        }
    }

    /// Full file name (with extension) or directory name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    /// Extension-less module path importers refer to.
    #[must_use]
    pub fn module_path(&self) -> Utf8PathBuf {
        match self.kind {
            ContributorKind::File => module_path(&self.path),
            ContributorKind::Directory => self.path.clone(),
        }
    }

    /// Returns the contributor path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

/// Which kinds of contributors collided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionScope {
    /// Two or more direct sibling files.
    WithinDirectory,
    /// Direct files and at least one subdirectory.
    RootVsSubdirectory,
    /// Two or more subdirectories, no direct file.
    CrossSubdirectory,
}

/// The strategy applied to one contributor of a collision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorOutcome {
    /// The contributor.
    pub contributor: Contributor,

    /// Strategy applied to it.
    pub strategy: ResolutionStrategy,

    /// Namespace alias when `strategy` is [`ResolutionStrategy::QualifiedAlias`].
    pub alias: Option<String>,
}

/// A name exported by more than one contributor of a directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conflict {
    /// Directory whose barrel the collision occurs in.
    pub directory: Utf8PathBuf,

    /// The colliding export name.
    pub name: String,

    /// Collision scope.
    pub scope: CollisionScope,

    /// Per-contributor outcome, in contributor order.
    pub contributors: Vec<ContributorOutcome>,

    /// Overall strategy: how (if at all) the name is exposed unqualified.
    pub strategy: ResolutionStrategy,

    /// Whether every contributor received a strategy.
    pub resolved: bool,
}

impl Conflict {
    /// Returns the contributor that keeps the unqualified name, if any.
    #[must_use]
    pub fn winner(&self) -> Option<&ContributorOutcome> {
        self.contributors.iter().find(|c| {
            matches!(
                c.strategy,
                ResolutionStrategy::Direct | ResolutionStrategy::TypeOnlyDirect
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contributor_module_path() {
        let file = Contributor::file("/src/a/b.service.ts".into());
        assert_eq!(file.module_path(), Utf8PathBuf::from("/src/a/b.service"));
        assert_eq!(file.name(), "b.service");

        let dir = Contributor::directory("/src/a/models".into());
        assert_eq!(dir.module_path(), Utf8PathBuf::from("/src/a/models"));
    }

    #[test]
    fn test_conflict_winner() {
        let conflict = Conflict {
            directory: "/src".into(),
            name: "Config".to_owned(),
            scope: CollisionScope::RootVsSubdirectory,
            contributors: vec![
                ContributorOutcome {
                    contributor: Contributor::file("/src/config.ts".into()),
                    strategy: ResolutionStrategy::Direct,
                    alias: None,
                },
                ContributorOutcome {
                    contributor: Contributor::directory("/src/settings".into()),
                    strategy: ResolutionStrategy::QualifiedAlias,
                    alias: Some("settings".to_owned()),
                },
            ],
            strategy: ResolutionStrategy::Direct,
            resolved: true,
        };
        let winner = conflict.winner().expect("conflict should have a winner");
        assert!(winner.contributor.is_file());
    }
}
