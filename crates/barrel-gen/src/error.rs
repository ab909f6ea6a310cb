//! Error types for the barrel-gen crate.
//!
//! This module provides the [`GenerateError`] type. Resolved export
//! conflicts are not errors; they are recorded in the run report.

use barrel_scanner::ScanError;
use camino::{Utf8Path, Utf8PathBuf};

/// Errors that can occur while generating barrels.
///
/// [`GenerateError::Structural`] only costs the affected directory its
/// barrel. Validation and resolution failures mean the resolver produced an
/// inconsistent plan, and the run stops without writing it.
///
/// # Examples
///
/// ```
/// use barrel_gen::GenerateError;
///
/// let err = GenerateError::validation("/src/api", "ApiResponse");
/// assert!(err.is_fatal());
/// assert!(err.to_string().contains("ApiResponse"));
///
/// let err = GenerateError::structural("/src/api/old", "directory vanished");
/// assert!(!err.is_fatal());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// A referenced file or directory vanished between discovery and emission.
    #[error("structural error in {directory}: {reason}")]
    Structural {
        /// Directory whose barrel could not be emitted.
        directory: Utf8PathBuf,
        /// What was missing.
        reason: String,
    },

    /// A barrel about to be written binds a name twice.
    #[error("barrel for {directory} would bind `{name}` more than once")]
    Validation {
        /// Directory whose barrel failed validation.
        directory: Utf8PathBuf,
        /// The duplicated binding.
        name: String,
    },

    /// A colliding name received no resolution strategy.
    #[error("no resolution strategy for `{name}` in {directory}")]
    Unresolved {
        /// Directory of the collision.
        directory: Utf8PathBuf,
        /// The unresolved name.
        name: String,
    },

    /// Failed to write or remove a barrel.
    #[error("failed to write barrel {path}: {source}")]
    Write {
        /// Barrel path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to rewrite a source file during healing.
    #[error("failed to heal {path}: {source}")]
    Heal {
        /// Source file path.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Discovery or analysis failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl GenerateError {
    /// Creates a [`GenerateError::Structural`].
    #[inline]
    pub fn structural(directory: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::Structural {
            directory: directory.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`GenerateError::Validation`].
    #[inline]
    pub fn validation(directory: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        Self::Validation {
            directory: directory.into(),
            name: name.into(),
        }
    }

    /// Creates a [`GenerateError::Unresolved`].
    #[inline]
    pub fn unresolved(directory: impl Into<Utf8PathBuf>, name: impl Into<String>) -> Self {
        Self::Unresolved {
            directory: directory.into(),
            name: name.into(),
        }
    }

    /// Creates a [`GenerateError::Write`].
    #[inline]
    pub fn write(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`GenerateError::Heal`].
    #[inline]
    pub fn heal(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Heal {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error must stop the whole run.
    ///
    /// Structural errors only affect one subtree; I/O errors on a single
    /// barrel or source file are reported and the run continues.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Validation { .. } | Self::Unresolved { .. } => true,
            Self::Scan(err) => err.is_fatal(),
            Self::Structural { .. } | Self::Write { .. } | Self::Heal { .. } => false,
        }
    }

    /// Short kebab-case label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Structural { .. } => "structural",
            Self::Validation { .. } => "validation",
            Self::Unresolved { .. } => "unresolved",
            Self::Write { .. } => "write",
            Self::Heal { .. } => "heal",
            Self::Scan(_) => "scan",
        }
    }

    /// Directory or file the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Structural { directory, .. }
            | Self::Validation { directory, .. }
            | Self::Unresolved { directory, .. } => Some(directory.as_path()),
            Self::Write { path, .. } | Self::Heal { path, .. } => Some(path.as_path()),
            Self::Scan(err) => err.path().map(Utf8PathBuf::as_path),
        }
    }
}
