//! One generation pass over the whole tree.
//!
//! Directories are processed level by level, deepest first, so every child
//! barrel of the current pass is final before its parent is resolved.
//! Directories at the same depth never depend on each other and are resolved
//! in parallel; their barrels are then written and registered one by one.

use std::collections::BTreeMap;

use barrel_core::{
    BarrelShape, Config, Conflict, Contributor, Directory, ParseWarning, WarningKind,
};
use barrel_scanner::ScanResult;
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::emitter::{BarrelEmitter, EmitAction};
use crate::error::GenerateError;
use crate::registry::ExportRegistry;
use crate::resolver::{ContributorSource, DirectoryInput, Resolution, Resolver};

/// Everything one pass produced.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// Shapes of the barrels emitted this pass, by directory.
    pub shapes: BTreeMap<Utf8PathBuf, BarrelShape>,

    /// Collisions resolved this pass.
    pub conflicts: Vec<Conflict>,

    /// Action taken for each barrel path.
    pub actions: BTreeMap<Utf8PathBuf, EmitAction>,

    /// Rendered barrels by directory (dry-run only).
    pub plan: BTreeMap<Utf8PathBuf, String>,

    /// Warnings raised while emitting.
    pub warnings: Vec<ParseWarning>,

    /// Directories that failed.
    pub errors: Vec<GenerateError>,

    /// Distinct names declared by source files.
    pub unique_names: usize,
}

impl PassOutcome {
    /// Returns `true` if any barrel was written or removed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.actions.values().any(|action| action.is_change())
    }

    /// Returns `true` if an error stopped the pass.
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.errors.iter().any(GenerateError::is_fatal)
    }

    /// Number of barrels that received `action`.
    #[must_use]
    pub fn count(&self, action: EmitAction) -> usize {
        self.actions.values().filter(|a| **a == action).count()
    }
}

/// Resolves and emits every directory of a scanned tree.
#[derive(Debug)]
pub struct BarrelGenerator<'c> {
    config: &'c Config,
    emitter: BarrelEmitter,
    dry_run: bool,
}

impl<'c> BarrelGenerator<'c> {
    /// Creates a generator.
    #[must_use]
    pub fn new(config: &'c Config, dry_run: bool) -> Self {
        Self {
            config,
            emitter: BarrelEmitter::new(&config.generate, dry_run),
            dry_run,
        }
    }

    /// Runs one pass: rebuilds the registry from `scan`, then resolves and
    /// emits bottom-up.
    ///
    /// A fatal error stops the pass after the level it occurred in; other
    /// errors only cost the affected directory (and thus its ancestors' view
    /// of it) its barrel.
    pub fn run_pass(&self, scan: &ScanResult) -> PassOutcome {
        let mut registry = ExportRegistry::from_modules(scan.modules.values());
        let resolver = Resolver::new(&self.config.resolve);
        let barrel_stem = Utf8Path::new(&self.config.generate.barrel_file_name)
            .file_stem()
            .unwrap_or("index");
        let mut outcome = PassOutcome {
            unique_names: registry.unique_names(),
            ..PassOutcome::default()
        };

        for level in scan.tree.levels_bottom_up() {
            let resolved: Vec<(&Directory, Result<Resolution, GenerateError>)> = level
                .par_iter()
                .filter(|dir| self.config.generate.root_barrel || dir.depth > 0)
                .map(|dir| {
                    let input = directory_input(dir, scan, &registry, &outcome.shapes, barrel_stem);
                    (*dir, resolver.resolve(&input))
                })
                .collect();

            for (dir, result) in resolved {
                let emitted = result.and_then(|resolution| {
                    let action = self.emitter.emit(dir, &resolution)?;
                    Ok((resolution, action))
                });
                match emitted {
                    Ok((resolution, action)) => {
                        self.record(dir, resolution, action, &mut registry, &mut outcome);
                    }
                    Err(err) => {
                        error!(directory = %dir.path, error = %err, "Barrel emission failed");
                        outcome.errors.push(err);
                    }
                }
            }

            if outcome.has_fatal() {
                break;
            }
        }

        info!(
            barrels = outcome.shapes.len(),
            conflicts = outcome.conflicts.len(),
            written = outcome.count(EmitAction::Written),
            removed = outcome.count(EmitAction::Removed),
            "Pass generated"
        );
        outcome
    }

    fn record(
        &self,
        dir: &Directory,
        resolution: Resolution,
        action: EmitAction,
        registry: &mut ExportRegistry,
        outcome: &mut PassOutcome,
    ) {
        let path = self.emitter.barrel_path(&dir.path);
        for conflict in &resolution.conflicts {
            debug!(
                directory = %conflict.directory,
                name = %conflict.name,
                strategy = ?conflict.strategy,
                "Resolved conflict"
            );
        }
        outcome.conflicts.extend(resolution.conflicts);

        if action == EmitAction::Foreign {
            outcome.warnings.push(ParseWarning::new(
                path.clone(),
                WarningKind::ForeignBarrel,
                "file without the generated marker uses the barrel name, left untouched",
            ));
            outcome.actions.insert(path, action);
            return;
        }

        if self.dry_run && !resolution.barrel.is_empty() {
            outcome.plan.insert(dir.path.clone(), resolution.barrel.render());
        }
        outcome.actions.insert(path, action);

        if !resolution.shape.is_empty() {
            registry.register_barrel(&resolution.shape);
            outcome.shapes.insert(dir.path.clone(), resolution.shape);
        }
    }
}

fn directory_input<'a>(
    dir: &'a Directory,
    scan: &'a ScanResult,
    registry: &'a ExportRegistry,
    shapes: &'a BTreeMap<Utf8PathBuf, BarrelShape>,
    barrel_stem: &'a str,
) -> DirectoryInput<'a> {
    let mut sources = BTreeMap::new();
    for module in scan.modules_in(&dir.path) {
        sources.insert(
            Contributor::file(module.path.clone()),
            ContributorSource::File(module),
        );
    }
    for child in &dir.children {
        if let Some(shape) = shapes.get(child) {
            sources.insert(
                Contributor::directory(child.clone()),
                ContributorSource::Barrel(shape),
            );
        }
    }
    DirectoryInput {
        directory: &dir.path,
        exports: registry.scope(&dir.path),
        sources,
        barrel_stem,
    }
}
