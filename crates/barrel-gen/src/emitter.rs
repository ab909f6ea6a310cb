//! Barrel validation and writing.
//!
//! The emitter is the last line of defence before disk: it re-checks that no
//! name is bound twice and that every target still exists, and refuses to
//! write a barrel that fails either check. Hand-written modules that happen
//! to use the barrel file name are never touched.

use std::fs;

use barrel_core::{BarrelModule, BarrelState, ContributorKind, Directory, GenerateConfig};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::GenerateError;
use crate::resolver::Resolution;

/// What happened to one directory's barrel file.
///
/// In dry-run mode the action describes what would have happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitAction {
    /// New or changed content was written.
    Written,
    /// Existing content was already identical.
    Unchanged,
    /// A previously generated barrel was removed because nothing is left to export.
    Removed,
    /// Nothing to export and no generated barrel present.
    Empty,
    /// A hand-written module occupies the barrel name.
    Foreign,
}

impl EmitAction {
    /// Returns `true` if the action modifies the tree.
    #[must_use]
    pub const fn is_change(self) -> bool {
        matches!(self, Self::Written | Self::Removed)
    }
}

/// Writes barrels for resolved directories.
#[derive(Debug, Clone)]
pub struct BarrelEmitter {
    barrel_file_name: String,
    dry_run: bool,
}

impl BarrelEmitter {
    /// Creates an emitter using the configured barrel file name.
    #[must_use]
    pub fn new(config: &GenerateConfig, dry_run: bool) -> Self {
        Self {
            barrel_file_name: config.barrel_file_name.clone(),
            dry_run,
        }
    }

    /// Path of `directory`'s barrel file.
    #[must_use]
    pub fn barrel_path(&self, directory: &Utf8Path) -> Utf8PathBuf {
        directory.join(&self.barrel_file_name)
    }

    /// Checks a barrel before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Validation`] if a name is bound twice and
    /// [`GenerateError::Structural`] if a target no longer exists.
    pub fn validate(&self, barrel: &BarrelModule) -> Result<(), GenerateError> {
        if let Some(name) = barrel.duplicate_binding() {
            return Err(GenerateError::validation(&barrel.directory, name));
        }

        for target in barrel.targets() {
            let present = match target.kind {
                ContributorKind::File => target.path.is_file(),
                ContributorKind::Directory => {
                    target.path.is_dir()
                        && (self.dry_run || self.barrel_path(&target.path).is_file())
                }
            };
            if !present {
                return Err(GenerateError::structural(
                    &barrel.directory,
                    format!("re-export target vanished: {}", target.path),
                ));
            }
        }
        Ok(())
    }

    /// Validates and writes the barrel of `directory`.
    ///
    /// # Errors
    ///
    /// Returns the validation errors of [`validate`](Self::validate), or
    /// [`GenerateError::Write`] if the file cannot be written or removed.
    pub fn emit(
        &self,
        directory: &Directory,
        resolution: &Resolution,
    ) -> Result<EmitAction, GenerateError> {
        let path = self.barrel_path(&directory.path);

        if directory.barrel == BarrelState::Foreign {
            debug!(path = %path, "Leaving hand-written barrel untouched");
            return Ok(EmitAction::Foreign);
        }

        if resolution.barrel.is_empty() {
            if directory.barrel != BarrelState::Generated {
                return Ok(EmitAction::Empty);
            }
            if !self.dry_run {
                fs::remove_file(&path).map_err(|err| GenerateError::write(&path, err))?;
            }
            info!(path = %path, "Removed empty barrel");
            return Ok(EmitAction::Removed);
        }

        self.validate(&resolution.barrel)?;
        let content = resolution.barrel.render();

        if directory.barrel == BarrelState::Generated
            && fs::read_to_string(&path).is_ok_and(|existing| existing == content)
        {
            debug!(path = %path, "Barrel unchanged");
            return Ok(EmitAction::Unchanged);
        }

        if !self.dry_run {
            fs::write(&path, &content).map_err(|err| GenerateError::write(&path, err))?;
        }
        info!(
            path = %path,
            statements = resolution.barrel.statements.len(),
            "Wrote barrel"
        );
        Ok(EmitAction::Written)
    }
}

#[cfg(test)]
mod tests {
    use barrel_core::{BarrelShape, Contributor, ReExportStatement};

    use super::*;

    fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        (dir, root)
    }

    fn resolution(dir: &Utf8Path, statements: Vec<ReExportStatement>) -> Resolution {
        let mut barrel = BarrelModule::new(dir.to_owned());
        barrel.statements = statements;
        Resolution {
            barrel,
            shape: BarrelShape::new(dir.to_owned()),
            conflicts: Vec::new(),
        }
    }

    #[test]
    fn test_duplicate_binding_is_not_written() {
        let (_tmp, root) = setup();
        fs::write(root.join("a.ts"), "export const X = 1;").expect("write a");
        fs::write(root.join("b.ts"), "export const X = 2;").expect("write b");
        let res = resolution(
            &root,
            vec![
                ReExportStatement::named(Contributor::file(root.join("a.ts")), vec!["X".into()], false),
                ReExportStatement::named(Contributor::file(root.join("b.ts")), vec!["X".into()], false),
            ],
        );

        let emitter = BarrelEmitter::new(&GenerateConfig::default(), false);
        let err = emitter
            .emit(&Directory::new(root.clone(), 0), &res)
            .expect_err("duplicate must fail");
        assert!(matches!(err, GenerateError::Validation { .. }));
        assert!(!root.join("index.ts").exists());
    }

    #[test]
    fn test_vanished_target_is_structural() {
        let (_tmp, root) = setup();
        let res = resolution(
            &root,
            vec![ReExportStatement::named(
                Contributor::file(root.join("gone.ts")),
                vec!["X".into()],
                false,
            )],
        );

        let emitter = BarrelEmitter::new(&GenerateConfig::default(), false);
        let err = emitter
            .emit(&Directory::new(root.clone(), 0), &res)
            .expect_err("missing target");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_write_then_unchanged_then_removed() {
        let (_tmp, root) = setup();
        fs::write(root.join("a.ts"), "export const a = 1;").expect("write a");
        let res = resolution(
            &root,
            vec![ReExportStatement::named(Contributor::file(root.join("a.ts")), vec!["a".into()], false)],
        );
        let emitter = BarrelEmitter::new(&GenerateConfig::default(), false);
        let mut dir = Directory::new(root.clone(), 0);

        assert_eq!(emitter.emit(&dir, &res).expect("write"), EmitAction::Written);
        dir.barrel = BarrelState::Generated;
        assert_eq!(emitter.emit(&dir, &res).expect("rewrite"), EmitAction::Unchanged);

        let empty = resolution(&root, Vec::new());
        assert_eq!(emitter.emit(&dir, &empty).expect("remove"), EmitAction::Removed);
        assert!(!root.join("index.ts").exists());
    }

    #[test]
    fn test_foreign_barrel_is_left_alone() {
        let (_tmp, root) = setup();
        fs::write(root.join("index.ts"), "export * from './a';\n").expect("write index");
        let mut dir = Directory::new(root.clone(), 0);
        dir.barrel = BarrelState::Foreign;

        let emitter = BarrelEmitter::new(&GenerateConfig::default(), false);
        let action = emitter.emit(&dir, &resolution(&root, Vec::new())).expect("emit");

        assert_eq!(action, EmitAction::Foreign);
        let text = fs::read_to_string(root.join("index.ts")).expect("read index");
        assert_eq!(text, "export * from './a';\n");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_tmp, root) = setup();
        fs::write(root.join("a.ts"), "export const a = 1;").expect("write a");
        let res = resolution(
            &root,
            vec![ReExportStatement::named(Contributor::file(root.join("a.ts")), vec!["a".into()], false)],
        );

        let emitter = BarrelEmitter::new(&GenerateConfig::default(), true);
        let action = emitter.emit(&Directory::new(root.clone(), 0), &res).expect("emit");

        assert_eq!(action, EmitAction::Written);
        assert!(!root.join("index.ts").exists());
    }
}
