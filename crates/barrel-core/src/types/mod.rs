//! Domain types for the barrelgen pipeline.
//!
//! # Module Organization
//!
//! - [`location`] - Source spans
//! - [`file`] - Source files and parse status
//! - [`export`] - Export declarations and binding forms
//! - [`import`] - Import statements (consumers of barrels)
//! - [`module`] - Per-file analysis results
//! - [`warning`] - Recoverable, file-level anomalies
//! - [`directory`] - The discovered directory tree
//! - [`conflict`] - Name collisions and their resolution
//! - [`barrel`] - Generated barrel modules and their exposed shape
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use barrel_core::{Conflict, ExportDeclaration, ModuleAnalysis, ResolutionStrategy};
//! ```

mod barrel;
mod conflict;
mod directory;
mod export;
mod file;
mod import;
mod location;
mod module;
mod warning;

pub use barrel::{
    AliasTarget, BarrelModule, BarrelShape, GENERATED_MARKER, ModuleTarget, QualifiedBinding,
    ReExportStatement, StatementForm,
};
pub use conflict::{
    CollisionScope, Conflict, Contributor, ContributorKind, ContributorOutcome,
    ResolutionStrategy,
};
pub use directory::{BarrelState, Directory, DirectoryTree};
pub use export::{BindingForm, ExportDeclaration, ExportKind};
pub use file::{ParseStatus, SourceFile};
pub use import::{ImportInfo, ImportSpecifier};
pub use location::SourceSpan;
pub use module::{DefaultStatement, ModuleAnalysis, StarReExport};
pub use warning::{ParseWarning, WarningKind};
