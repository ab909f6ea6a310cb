//! Scan failures and how far each one reaches.
//!
//! A scan either produces a [`ScanResult`](crate::ScanResult) for the whole
//! tree or stops. The one exception is a single file: a source that cannot
//! be read, or that the parser gives up on, is dropped from the result and
//! surfaces as a [`WarningKind::Unreadable`] warning through
//! [`ScanError::into_warning`]. Its directory's barrel is then generated
//! without it.
//!
//! Everything else ends the scan: a missing root or category, an
//! ignore-file error during traversal, a non-UTF-8 path, or a grammar that
//! fails to load.

use barrel_core::{ParseWarning, WarningKind};
use barrel_parser::ParseError;
use camino::Utf8PathBuf;

/// Why a scan, or the analysis of one of its files, failed.
///
/// ```
/// use barrel_scanner::ScanError;
///
/// let err = ScanError::config("category `api` is not a directory");
/// assert!(err.is_fatal());
/// assert!(err.into_warning().is_err());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Directory traversal failed.
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// A source file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// The source file.
        path: Utf8PathBuf,
        /// What the file system reported.
        #[source]
        source: std::io::Error,
    },

    /// The parser rejected a file or could not be set up for it.
    #[error("cannot analyze {path}: {source}")]
    Parse {
        /// The source file.
        path: Utf8PathBuf,
        /// What the parser reported.
        #[source]
        source: ParseError,
    },

    /// Root, categories or worker pool are unusable.
    #[error("invalid scan setup: {0}")]
    Config(String),

    /// The tree contains a path barrels could not refer to.
    #[error("non UTF-8 path in source tree: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// An unreadable source file.
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// A file the parser failed on.
    pub fn parse(path: impl Into<Utf8PathBuf>, source: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// An unusable scan setup.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` if only the file in [`path`](Self::path) is lost.
    ///
    /// A grammar that fails to load affects every file, so a
    /// [`ScanError::Parse`] is only file-scoped when the parser says so.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Read { .. } => true,
            Self::Parse { source, .. } => source.is_recoverable(),
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) => false,
        }
    }

    /// Returns `true` if the scan must stop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// The source file that failed, for file-scoped errors.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::Walk(_) | Self::Config(_) | Self::NonUtf8Path(_) => None,
        }
    }

    /// Turns a file-scoped error into the warning the run reports instead.
    ///
    /// # Errors
    ///
    /// Gives `self` back unchanged if the scan cannot continue.
    pub fn into_warning(self) -> Result<ParseWarning, Self> {
        if self.is_fatal() {
            return Err(self);
        }
        let message = self.to_string();
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => {
                Ok(ParseWarning::new(path, WarningKind::Unreadable, message))
            }
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_unreadable_file_becomes_warning() {
        let err = ScanError::read(
            "src/api/games.ts",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_recoverable());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/api/games.ts"));

        let warning = err.into_warning().expect("file-scoped");
        assert_eq!(warning.kind, WarningKind::Unreadable);
        assert_eq!(warning.path.as_str(), "src/api/games.ts");
        assert!(warning.message.contains("denied"));
    }

    #[test]
    fn test_grammar_failure_stops_the_scan() {
        let err = ScanError::parse("src/api/games.ts", ParseError::Parse);
        assert!(err.is_recoverable());

        let err = ScanError::parse("src/api/games.ts", ParseError::LanguageInit);
        assert!(err.is_fatal());
        assert!(matches!(err.into_warning(), Err(ScanError::Parse { .. })));
    }

    #[test]
    fn test_tree_level_errors_have_no_path() {
        let err = ScanError::NonUtf8Path(std::path::PathBuf::from("src/bad"));
        assert!(err.is_fatal());
        assert!(err.path().is_none());
        assert!(err.to_string().contains("src/bad"));
    }
}
