//! Self-healing rewrites of source files.
//!
//! Two defects are corrected in place:
//!
//! - **Type-only defaults**: a module whose exports are all type-only but
//!   which still has an `export default` statement. `export default
//!   interface Foo {}` becomes `export interface Foo {}`; any other form is
//!   removed.
//! - **Stale consumer imports**: an import from a barrel directory that no
//!   longer matches the barrel's shape. A name that became type-only gets a
//!   `type` modifier, and a name that is now only reachable through a
//!   qualified alias is moved to a direct import of its declaring module.
//!
//! Every rewrite invalidates the file's analysis so the next pass re-reads it.

use std::collections::BTreeMap;
use std::fs;
use std::ops::Range;

use barrel_core::naming::{module_path, relative_specifier, resolve_specifier};
use barrel_core::{
    BarrelShape, BindingForm, FxHashSet, HealConfig, ImportInfo, ImportSpecifier,
    ModuleAnalysis, ParseWarning, WarningKind,
};
use barrel_scanner::{AnalysisCache, ScanResult};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::GenerateError;

/// Kind of correction applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealKind {
    /// A default export was stripped from a type-only module.
    StripTypeOnlyDefault,
    /// A consumer import was rewritten to match a barrel's new shape.
    RewriteStaleImport,
}

/// One correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealRecord {
    /// File that was (or in dry-run mode would have been) rewritten.
    pub path: Utf8PathBuf,

    /// Kind of correction.
    pub kind: HealKind,

    /// Line of the rewritten statement.
    pub line: u32,

    /// Human-readable detail.
    pub detail: String,

    /// `false` in dry-run mode.
    pub applied: bool,
}

/// Result of one healing step.
#[derive(Debug, Default)]
pub struct HealOutcome {
    /// Corrections made.
    pub records: Vec<HealRecord>,

    /// Files rewritten on disk.
    pub rewritten: Vec<Utf8PathBuf>,

    /// Rewrites that were skipped.
    pub warnings: Vec<ParseWarning>,

    /// Files that could not be written.
    pub errors: Vec<GenerateError>,
}

impl HealOutcome {
    /// Returns `true` if any file changed on disk.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.rewritten.is_empty()
    }
}

struct Edit {
    range: Range<usize>,
    replacement: String,
}

#[derive(Default)]
struct FilePlan {
    edits: Vec<Edit>,
    records: Vec<(HealKind, u32, String)>,
    warnings: Vec<ParseWarning>,
}

/// Detects and fixes structural defects in analyzed modules.
#[derive(Debug, Clone, Copy)]
pub struct Healer<'c> {
    config: &'c HealConfig,
    barrel_file_name: &'c str,
    dry_run: bool,
}

impl<'c> Healer<'c> {
    /// Creates a healer.
    #[must_use]
    pub const fn new(config: &'c HealConfig, barrel_file_name: &'c str, dry_run: bool) -> Self {
        Self {
            config,
            barrel_file_name,
            dry_run,
        }
    }

    /// Heals every module of `scan`.
    ///
    /// `previous` holds the barrel shapes emitted by the previous pass; stale
    /// imports are only detected against those. Files are written before
    /// this returns, and their cache entries are dropped.
    pub fn heal(
        &self,
        scan: &ScanResult,
        previous: &BTreeMap<Utf8PathBuf, BarrelShape>,
        cache: &AnalysisCache,
    ) -> HealOutcome {
        let mut outcome = HealOutcome::default();
        let claimed: FxHashSet<Utf8PathBuf> =
            scan.modules.keys().map(|path| module_path(path)).collect();

        for (path, module) in &scan.modules {
            let Some(file) = scan.files.get(path) else {
                continue;
            };
            let plan = self.plan(&file.text, module, previous, &claimed);
            outcome.warnings.extend(plan.warnings);
            if plan.edits.is_empty() {
                continue;
            }

            let Some(healed) = apply_edits(&file.text, plan.edits) else {
                warn!(path = %path, "Overlapping rewrites, file left unchanged");
                continue;
            };
            if healed == file.text {
                continue;
            }

            if !self.dry_run {
                if let Err(err) = fs::write(path, &healed) {
                    outcome.errors.push(GenerateError::heal(path, err));
                    continue;
                }
                cache.invalidate(path);
                outcome.rewritten.push(path.clone());
            }

            for (kind, line, detail) in plan.records {
                info!(path = %path, line, kind = ?kind, "{detail}");
                outcome.records.push(HealRecord {
                    path: path.clone(),
                    kind,
                    line,
                    detail,
                    applied: !self.dry_run,
                });
            }
        }
        outcome
    }

    fn plan(
        &self,
        text: &str,
        module: &ModuleAnalysis,
        previous: &BTreeMap<Utf8PathBuf, BarrelShape>,
        claimed: &FxHashSet<Utf8PathBuf>,
    ) -> FilePlan {
        let mut plan = FilePlan::default();

        if self.config.strip_type_only_defaults && module.has_type_only_violation() {
            strip_defaults(text, module, &mut plan);
        }

        if self.config.rewrite_stale_imports && !previous.is_empty() {
            for import in module.imports.iter().filter(|i| i.is_relative()) {
                let Some(shape) = resolve_specifier(module.directory(), &import.specifier)
                    .and_then(|target| {
                        previous.get(self.barrel_directory(&target, claimed)?)
                    })
                else {
                    continue;
                };
                rewrite_import(import, shape, module, &mut plan);
            }
        }
        plan
    }

    /// Maps `./api`, `./api/index` and `./api/index.js` to `./api`.
    ///
    /// A bare directory specifier that a module file (`api.ts`) also answers
    /// to points at that file, not at the barrel.
    fn barrel_directory<'p>(
        &self,
        target: &'p Utf8Path,
        claimed: &FxHashSet<Utf8PathBuf>,
    ) -> Option<&'p Utf8Path> {
        let barrel_stem = Utf8Path::new(self.barrel_file_name).file_stem();
        match target.parent() {
            Some(parent) if target.file_stem() == barrel_stem => Some(parent),
            _ if claimed.contains(target) => None,
            _ => Some(target),
        }
    }
}

fn strip_defaults(text: &str, module: &ModuleAnalysis, plan: &mut FilePlan) {
    for statement in &module.default_statements {
        let span = statement.span;
        let edit = match statement.declaration {
            Some((start, end)) => text.get(start..end).map(|declaration| Edit {
                range: span.range(),
                replacement: format!("export {declaration}"),
            }),
            None => Some(Edit {
                range: span.start..line_end(text, span.end),
                replacement: String::new(),
            }),
        };
        if let Some(edit) = edit {
            plan.edits.push(edit);
            plan.records.push((
                HealKind::StripTypeOnlyDefault,
                span.line,
                "removed default export from type-only module".to_owned(),
            ));
        }
    }
}

fn rewrite_import(
    import: &ImportInfo,
    shape: &BarrelShape,
    module: &ModuleAnalysis,
    plan: &mut FilePlan,
) {
    let mut kept = import.clone();
    kept.named.clear();
    let mut moved: BTreeMap<(Utf8PathBuf, bool), Vec<ImportSpecifier>> = BTreeMap::new();
    let mut changes = Vec::new();

    for spec in &import.named {
        let type_only = import.type_only || spec.type_only;
        match shape.unqualified.get(&spec.name) {
            Some(BindingForm::TypeOnly) if !type_only => {
                kept.named.push(ImportSpecifier {
                    type_only: true,
                    ..spec.clone()
                });
                changes.push(format!("`{}` is type-only", spec.name));
            }
            Some(_) => kept.named.push(spec.clone()),
            None => match shape.qualified.get(&spec.name).map(Vec::as_slice) {
                Some([binding]) => {
                    let specifier = ImportSpecifier {
                        type_only: false,
                        ..spec.clone()
                    };
                    moved
                        .entry((binding.module.clone(), type_only || binding.form.is_type_only()))
                        .or_default()
                        .push(specifier);
                    changes.push(format!("`{}` moved to {}", spec.name, binding.module));
                }
                Some(bindings) if bindings.len() > 1 => {
                    plan.warnings.push(
                        ParseWarning::new(
                            module.path.clone(),
                            WarningKind::AmbiguousRewrite,
                            format!(
                                "`{}` from '{}' is declared by {} modules",
                                spec.name,
                                import.specifier,
                                bindings.len()
                            ),
                        )
                        .at_line(import.span.line),
                    );
                    kept.named.push(spec.clone());
                }
                _ => kept.named.push(spec.clone()),
            },
        }
    }

    if changes.is_empty() {
        return;
    }

    if !kept.type_only
        && kept.default_binding.is_none()
        && kept.namespace.is_none()
        && !kept.named.is_empty()
        && kept.named.iter().all(|s| s.type_only)
    {
        kept.type_only = true;
        for spec in &mut kept.named {
            spec.type_only = false;
        }
    }

    let mut statements = Vec::with_capacity(moved.len() + 1);
    if !kept.is_empty() {
        statements.push(kept.render());
    }
    for ((target, type_only), named) in moved {
        let mut direct = ImportInfo::new(relative_specifier(module.directory(), &target), import.span);
        direct.quote = import.quote;
        direct.type_only = type_only;
        direct.named = named;
        statements.push(direct.render());
    }

    plan.edits.push(Edit {
        range: import.span.range(),
        replacement: statements.join("\n"),
    });
    plan.records.push((
        HealKind::RewriteStaleImport,
        import.span.line,
        format!("rewrote import from '{}': {}", import.specifier, changes.join(", ")),
    ));
}

/// Extends `end` past the line break that follows it, if any.
fn line_end(text: &str, end: usize) -> usize {
    let rest = text.get(end..).unwrap_or_default();
    if rest.starts_with("\r\n") {
        end + 2
    } else if rest.starts_with('\n') {
        end + 1
    } else {
        end
    }
}

/// Applies non-overlapping edits. Returns `None` if edits overlap or a range
/// does not fall on character boundaries.
fn apply_edits(text: &str, mut edits: Vec<Edit>) -> Option<String> {
    edits.sort_by_key(|edit| edit.range.start);
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in &edits {
        if edit.range.start < cursor {
            return None;
        }
        out.push_str(text.get(cursor..edit.range.start)?);
        out.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    out.push_str(text.get(cursor..)?);
    Some(out)
}
