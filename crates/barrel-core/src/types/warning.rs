//! File-level anomalies that are recovered locally.

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Category of a [`ParseWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The parser recovered from a syntax error.
    SyntaxError,
    /// The module has more than one default export; its default is ignored.
    DuplicateDefault,
    /// A re-export source could not be matched to an analyzed sibling.
    UnresolvedReExport,
    /// A barrel-named file without the generated marker was left untouched.
    ForeignBarrel,
    /// A stale consumer import could not be rewritten unambiguously.
    AmbiguousRewrite,
    /// The file could not be read or parsed at all.
    Unreadable,
}

impl WarningKind {
    /// Short, stable label used in console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax-error",
            Self::DuplicateDefault => "duplicate-default",
            Self::UnresolvedReExport => "unresolved-re-export",
            Self::ForeignBarrel => "foreign-barrel",
            Self::AmbiguousRewrite => "ambiguous-rewrite",
            Self::Unreadable => "unreadable",
        }
    }
}

/// A recoverable anomaly tied to one file.
///
/// Warnings end up in the run report and never affect the exit code.
///
/// # Examples
///
/// ```
/// use barrel_core::{ParseWarning, WarningKind};
///
/// let warning = ParseWarning::new("src/a.ts".into(), WarningKind::DuplicateDefault, "2 default exports")
///     .at_line(9);
/// assert_eq!(warning.to_string(), "src/a.ts:9: duplicate-default: 2 default exports");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParseWarning {
    /// File the warning refers to.
    pub path: Utf8PathBuf,

    /// 1-indexed line, when known.
    pub line: Option<u32>,

    /// Warning category.
    pub kind: WarningKind,

    /// Human-readable detail.
    pub message: String,
}

impl ParseWarning {
    /// Creates a warning without a line number.
    #[must_use]
    pub fn new(path: Utf8PathBuf, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            path,
            line: None,
            kind,
            message: message.into(),
        }
    }

    /// Attaches a line number.
    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: {}: {}", self.path, self.kind.label(), self.message),
            None => write!(f, "{}: {}: {}", self.path, self.kind.label(), self.message),
        }
    }
}
