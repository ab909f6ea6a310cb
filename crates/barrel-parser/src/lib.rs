//! Source export analyzer for barrelgen.
//!
//! This crate turns the text of one ECMAScript/TypeScript module into a
//! [`barrel_core::ModuleAnalysis`]: its exports (classified as default, named
//! or type-only), its default-export statements, unexpanded `export *`
//! statements, and its imports.
//!
//! # Overview
//!
//! The seam is the [`SourceParser`] trait; [`TsParser`] implements it with
//! tree-sitter's TypeScript and TSX grammars:
//!
//! ```
//! use barrel_parser::{SourceParser, TsParser};
//! use camino::Utf8Path;
//!
//! let mut parser = TsParser::new()?;
//! let analysis = parser.analyze(
//!     Utf8Path::new("/src/models/game.ts"),
//!     r"
//!         export interface Game { id: number }
//!         export type GameId = Game['id'];
//!     ",
//! )?;
//!
//! assert!(analysis.is_type_only());
//! # Ok::<(), barrel_parser::ParseError>(())
//! ```
//!
//! # Type-only Classification
//!
//! A declaration is type-only when it is an interface, type alias or enum, or
//! when it is exported with `export type` or an inline `type` modifier. Local
//! export lists (`export { a }`) are classified against the module's own
//! top-level declarations and `import type` bindings. A default export is
//! type-backed when it is an interface/type declaration or names a type-only
//! binding (or nothing in the module at all).
//!
//! Re-exports from other modules (`export { a } from './x'`,
//! `export * from './x'`) cannot be classified from one file; the scanner
//! settles them once all siblings are analyzed.
//!
//! # Arena-Based Parsing
//!
//! For parallel scanning, [`TsParser::analyze_in`] takes a caller-supplied
//! [`bumpalo::Bump`], typically a member of a `bumpalo_herd::Herd`, so
//! extraction scratch data is allocated per thread and freed in bulk.
//!
//! # Thread Safety
//!
//! [`TsParser`] is `Send` but not `Sync`. Compiled queries are shared
//! globally and compiled once per grammar.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod arena;
mod bindings;
pub mod error;
mod exports;
mod imports;
mod parser;
pub mod queries;
mod syntax;

pub use error::ParseError;
pub use parser::{Dialect, SourceParser, TsParser};

// Re-export bumpalo for callers of `TsParser::analyze_in`.
pub use bumpalo::Bump;
