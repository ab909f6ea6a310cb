//! Barrel generation with cross-module conflict resolution.
//!
//! Given a scanned source tree, this crate decides for every directory which
//! names its barrel re-exports unqualified, which contributors are reachable
//! only through a namespace alias, and which are dropped. It then writes the
//! barrels bottom-up and repairs source files the new barrels invalidate.
//!
//! # Overview
//!
//! - [`ExportRegistry`]: pass-scoped index of names per directory scope
//! - [`Resolver`]: pure per-directory decision (priority, root-over-subdir,
//!   sibling aliasing) producing a [`Resolution`]
//! - [`BarrelEmitter`]: validation and idempotent writes
//! - [`BarrelGenerator`]: one bottom-up pass over the tree
//! - [`Healer`]: type-only default stripping and stale import rewrites
//! - [`PassController`]: bounded fixed-point iteration
//! - [`RunReport`]: JSON summary
//!
//! # Example
//!
//! ```no_run
//! use barrel_core::Config;
//!
//! let mut config = Config::default();
//! config.generate.root_path = "./src".into();
//!
//! let report = barrel_gen::generate(&config, false)?;
//! println!("{} barrels written in {} passes", report.barrels_written, report.passes);
//! # Ok::<(), barrel_gen::GenerateError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! PassController
//!     │
//!     ├── Scanner + AnalysisCache (barrel-scanner)
//!     │
//!     ├── Healer
//!     │       └── previous pass's BarrelShapes
//!     │
//!     └── BarrelGenerator (per depth level, deepest first)
//!             ├── ExportRegistry
//!             ├── Resolver (rayon, siblings in parallel)
//!             └── BarrelEmitter (sequential writes)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod controller;
mod emitter;
mod error;
mod generator;
mod heal;
mod registry;
mod report;
mod resolver;

pub use controller::PassController;
pub use emitter::{BarrelEmitter, EmitAction};
pub use error::GenerateError;
pub use generator::{BarrelGenerator, PassOutcome};
pub use heal::{HealKind, HealOutcome, HealRecord, Healer};
pub use registry::{ExportRegistry, ScopeExports};
pub use report::{ReportError, RunReport};
pub use resolver::{ContributorSource, DirectoryInput, Resolution, Resolver};

use barrel_core::Config;

/// Runs the full pipeline over `config.generate.root_path`.
///
/// In dry-run mode nothing is written; the report's `plan` holds the barrels
/// that would be emitted.
///
/// # Errors
///
/// Returns an error if the tree cannot be scanned. Failures inside a pass are
/// recorded in the report instead.
pub fn generate(config: &Config, dry_run: bool) -> Result<RunReport, GenerateError> {
    PassController::new(config, dry_run).run()
}
