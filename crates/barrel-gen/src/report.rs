//! Machine-readable summary of a run.

use std::collections::BTreeMap;
use std::fs;

use barrel_core::{Conflict, ParseWarning};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::emitter::EmitAction;
use crate::error::GenerateError;
use crate::generator::PassOutcome;
use crate::heal::{HealOutcome, HealRecord};

/// An error as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    /// Error class (`structural`, `validation`, ...).
    pub kind: String,

    /// Offending directory or file.
    pub path: Option<Utf8PathBuf>,

    /// Display message.
    pub message: String,
}

impl From<&GenerateError> for ReportError {
    fn from(err: &GenerateError) -> Self {
        Self {
            kind: err.label().to_owned(),
            path: err.path().map(Utf8Path::to_path_buf),
            message: err.to_string(),
        }
    }
}

/// Summary of a whole run, written as JSON.
///
/// Conflicts, warnings and errors describe the last pass; barrel counts and
/// healing records cover every pass.
///
/// # Examples
///
/// ```
/// use barrel_gen::RunReport;
///
/// let report = RunReport::new(true);
/// let json = report.to_json().expect("serializable");
/// assert!(json.contains("\"dry_run\": true"));
/// assert!(!report.has_errors());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Source files analyzed in the last pass.
    pub files_analyzed: usize,

    /// Distinct names declared by source files.
    pub unique_export_names: usize,

    /// Collisions and how they were resolved.
    pub conflicts: Vec<Conflict>,

    /// Barrels written (or that would be written in dry-run mode).
    pub barrels_written: usize,

    /// Barrels whose content was already up to date.
    pub barrels_unchanged: usize,

    /// Generated barrels removed because their directory exposes nothing.
    pub barrels_removed: usize,

    /// Passes run.
    pub passes: usize,

    /// `true` if the last pass neither rewrote a file nor changed a barrel.
    pub converged: bool,

    /// Healing corrections.
    pub healed: Vec<HealRecord>,

    /// Non-fatal diagnostics.
    pub warnings: Vec<ParseWarning>,

    /// Failed directories and files.
    pub errors: Vec<ReportError>,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Rendered barrels by directory, dry-run only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub plan: BTreeMap<Utf8PathBuf, String>,

    #[serde(skip)]
    actions: BTreeMap<Utf8PathBuf, EmitAction>,
}

impl RunReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Folds one pass into the report.
    ///
    /// A barrel written or removed in an earlier pass stays counted as such
    /// even if later passes leave it unchanged.
    pub fn record_pass(&mut self, files_analyzed: usize, heal: HealOutcome, pass: PassOutcome) {
        self.passes += 1;
        self.files_analyzed = files_analyzed;
        self.unique_export_names = pass.unique_names;
        self.conflicts = pass.conflicts;
        self.plan = pass.plan;
        self.healed.extend(heal.records);

        self.warnings = heal.warnings;
        self.warnings.extend(pass.warnings);
        self.errors = heal
            .errors
            .iter()
            .chain(&pass.errors)
            .map(ReportError::from)
            .collect();

        for (path, action) in pass.actions {
            match self.actions.get(&path) {
                Some(previous) if previous.is_change() && !action.is_change() => {}
                _ => {
                    self.actions.insert(path, action);
                }
            }
        }
        self.barrels_written = self.count(EmitAction::Written);
        self.barrels_unchanged = self.count(EmitAction::Unchanged);
        self.barrels_removed = self.count(EmitAction::Removed);
    }

    /// Adds warnings raised outside a pass's heal and emit steps.
    pub fn extend_warnings(&mut self, warnings: impl IntoIterator<Item = ParseWarning>) {
        self.warnings.extend(warnings);
    }

    /// Records an error that aborted the run.
    pub fn push_error(&mut self, err: &GenerateError) {
        self.errors.push(ReportError::from(err));
    }

    /// Returns `true` if the run should exit with a failure status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the report to `path`.
    pub fn write_to(&self, path: &Utf8Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        fs::write(path, json + "\n")
    }

    fn count(&self, action: EmitAction) -> usize {
        self.actions.values().filter(|a| **a == action).count()
    }
}
