//! Source file representation.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::hash::content_hash;

/// Outcome of parsing a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// The file parsed without syntax errors.
    #[default]
    Ok,
    /// The parser recovered from syntax errors; exports may be incomplete.
    SyntaxWarning,
}

/// A source module as read from disk.
///
/// Owned by the analysis cache. Only the self-healing pass changes the file
/// behind it, after which the cached entry is invalidated and the file is
/// read again.
///
/// # Examples
///
/// ```
/// use barrel_core::{ParseStatus, SourceFile};
///
/// let file = SourceFile::new("src/a.ts".into(), "export const a = 1;".to_owned());
/// assert_eq!(file.status, ParseStatus::Ok);
/// assert_eq!(file.content_hash, barrel_core::content_hash("export const a = 1;"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path to the file.
    pub path: Utf8PathBuf,

    /// Raw UTF-8 text.
    pub text: String,

    /// Fx hash of `text`.
    pub content_hash: u64,

    /// Parse status of the most recent analysis.
    pub status: ParseStatus,
}

impl SourceFile {
    /// Creates a source file, hashing its text.
    #[must_use]
    pub fn new(path: Utf8PathBuf, text: String) -> Self {
        let content_hash = content_hash(&text);
        Self {
            path,
            text,
            content_hash,
            status: ParseStatus::Ok,
        }
    }

    /// Sets the parse status.
    #[must_use]
    pub const fn with_status(mut self, status: ParseStatus) -> Self {
        self.status = status;
        self
    }
}
