//! Core types, errors, and configuration for the barrelgen tool.
//!
//! This crate provides the foundational types shared across the workspace:
//!
//! - Configuration structures ([`Config`] and its sections)
//! - Error types for configuration loading
//! - Domain types for the barrel pipeline ([`ModuleAnalysis`],
//!   [`ExportDeclaration`], [`DirectoryTree`], [`Conflict`], [`BarrelModule`])
//! - Type aliases for `FxHashMap`/`FxHashSet`

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod naming;
pub mod types;

pub use config::{
    Config, DemotionPolicy, GenerateConfig, HealConfig, PriorityRule, ResolveConfig,
};
pub use error::ConfigError;
pub use hash::{content_hash, FxHashMap, FxHashSet};
pub use types::*;
