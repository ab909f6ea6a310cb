//! Tree discovery and parallel module analysis for barrelgen.
//!
//! This crate produces the per-pass view of a source tree: which directories
//! exist, which source files each one holds directly, and what every file
//! exports. Analyses are cached by content hash so later passes of the same
//! run only re-parse files that changed.
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`TreeWalker`]: directory traversal respecting `.gitignore` patterns
//! - [`ModuleAnalyzer`]: parallel parsing with rayon + bumpalo arenas
//! - [`AnalysisCache`]: content-addressed cache with `FxHashMap` + `RwLock`
//! - [`settle_reexports`]: sequential fold that classifies and expands
//!   re-exports once every module is known
//! - [`ScanStats`]: atomic counters
//!
//! # Example
//!
//! ```no_run
//! use barrel_core::GenerateConfig;
//! use barrel_scanner::{AnalysisCache, Scanner};
//!
//! let config = GenerateConfig { root_path: "./src".into(), ..GenerateConfig::default() };
//! let scanner = Scanner::new(&config)?;
//! let cache = AnalysisCache::new();
//!
//! let result = scanner.scan(&cache)?;
//! println!("Analyzed {} modules", result.modules.len());
//! # Ok::<(), barrel_scanner::ScanError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scanner
//!     │
//!     ├── TreeWalker (DirectoryTree)
//!     │       └── WalkBuilder (ignore crate)
//!     │
//!     ├── ModuleAnalyzer (parallel parsing)
//!     │       ├── Herd (per-thread arenas)
//!     │       └── TsParser (barrel-parser)
//!     │
//!     ├── AnalysisCache (FxHashMap + RwLock)
//!     │
//!     └── settle_reexports (single-writer fold)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod analyzer;
mod cache;
mod error;
mod reexports;
mod stats;
mod walker;

pub use analyzer::ModuleAnalyzer;
pub use cache::{AnalysisCache, CachedModule};
pub use error::ScanError;
pub use reexports::settle_reexports;
pub use stats::{ScanStats, StatsSnapshot};
pub use walker::TreeWalker;

use std::collections::BTreeMap;
use std::sync::Arc;

use barrel_core::{DirectoryTree, GenerateConfig, ModuleAnalysis, ParseWarning, SourceFile};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info, warn};

/// Result of one scan.
#[derive(Debug)]
pub struct ScanResult {
    /// Discovered directories.
    pub tree: DirectoryTree,

    /// Source files that were read successfully.
    pub files: BTreeMap<Utf8PathBuf, Arc<SourceFile>>,

    /// Settled analyses, keyed by path.
    pub modules: BTreeMap<Utf8PathBuf, ModuleAnalysis>,

    /// Warnings from analysis and re-export settling, plus unreadable files.
    pub warnings: Vec<ParseWarning>,

    /// Counters for this scan.
    pub stats: StatsSnapshot,
}

impl ScanResult {
    /// Looks up a module analysis.
    #[must_use]
    pub fn module(&self, path: &Utf8Path) -> Option<&ModuleAnalysis> {
        self.modules.get(path)
    }

    /// Analyses of the direct files of `dir`, in file-name order.
    pub fn modules_in<'a>(&'a self, dir: &Utf8Path) -> impl Iterator<Item = &'a ModuleAnalysis> + 'a {
        self.tree
            .get(dir)
            .into_iter()
            .flat_map(|d| d.files.iter())
            .filter_map(|path| self.modules.get(path))
    }
}

/// Discovers and analyzes a source tree.
#[derive(Debug)]
pub struct Scanner {
    walker: TreeWalker,
    analyzer: ModuleAnalyzer,
}

impl Scanner {
    /// Creates a scanner from the generate section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the root or a category directory is
    /// missing, or if the worker pool cannot be built.
    pub fn new(config: &GenerateConfig) -> Result<Self, ScanError> {
        let walker = TreeWalker::from_config(config)?;
        let analyzer = match config.max_parallel_jobs {
            Some(jobs) if jobs > 0 => ModuleAnalyzer::with_max_jobs(jobs)?,
            _ => ModuleAnalyzer::new(),
        };
        Ok(Self { walker, analyzer })
    }

    /// Canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.walker.root()
    }

    /// Discovers the tree and analyzes every source file in it.
    ///
    /// Unreadable files are reported as
    /// [`Unreadable`](barrel_core::WarningKind::Unreadable) warnings and left
    /// out of the result. Cache entries for files that no longer exist are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if traversal fails, or a fatal
    /// [`ScanError::Parse`] if the grammar cannot be loaded.
    pub fn scan(&self, cache: &AnalysisCache) -> Result<ScanResult, ScanError> {
        info!(root = %self.walker.root(), "Starting scan");

        let tree = self.walker.discover()?;
        let paths: Vec<Utf8PathBuf> = tree.files().cloned().collect();
        info!(count = paths.len(), directories = tree.len(), "Collected source files");

        let stats = ScanStats::new();
        let results = self.analyzer.analyze_files(&paths, cache, &stats);

        let mut files = BTreeMap::new();
        let mut modules = BTreeMap::new();
        let mut warnings = Vec::new();

        for (path, result) in results {
            match result {
                Ok(entry) => {
                    debug!(path = %path, exports = entry.analysis.exports.len(), "Analyzed module");
                    warnings.extend(entry.analysis.warnings.iter().cloned());
                    modules.insert(path.clone(), ModuleAnalysis::clone(&entry.analysis));
                    files.insert(path, entry.file);
                }
                Err(err) => {
                    let warning = err.into_warning()?;
                    warn!(path = %path, error = %warning.message, "Skipping unreadable file");
                    warnings.push(warning);
                }
            }
        }

        warnings.extend(settle_reexports(&mut modules));
        cache.retain(|path| files.contains_key(path));

        let stats = stats.snapshot();
        info!(
            parsed = stats.parsed,
            cached = stats.cache_hits,
            syntax_warnings = stats.syntax_warnings,
            errors = stats.errors,
            "Scan completed"
        );

        Ok(ScanResult {
            tree,
            files,
            modules,
            warnings,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use barrel_core::{ExportKind, WarningKind};

    use super::*;

    fn write(root: &Utf8Path, rel: &str, text: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dirs");
        }
        fs::write(path, text).expect("write file");
    }

    fn setup() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        (dir, root)
    }

    #[test]
    fn test_scan_settles_reexports() {
        let (_dir, root) = setup();
        write(&root, "models/user.ts", "export interface User { id: number }");
        write(&root, "models/facade.ts", "export { User } from './user';");
        write(&root, "models/all.ts", "export * from './user';");

        let config = GenerateConfig {
            root_path: root.clone(),
            ..GenerateConfig::default()
        };
        let scanner = Scanner::new(&config).expect("scanner");
        let cache = AnalysisCache::new();
        let result = scanner.scan(&cache).expect("scan");

        let models = scanner.root().join("models");
        let facade = result.module(&models.join("facade.ts")).expect("facade");
        assert_eq!(facade.exports[0].kind, ExportKind::TypeOnly);
        let all = result.module(&models.join("all.ts")).expect("all");
        assert!(all.is_type_only());
        assert_eq!(result.modules_in(&models).count(), 3);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_package_star_keeps_module_out_of_type_only() {
        let (_dir, root) = setup();
        write(
            &root,
            "ui/props.ts",
            "export interface Props { a: string }\nexport * from 'some-package';\n",
        );

        let config = GenerateConfig {
            root_path: root.clone(),
            ..GenerateConfig::default()
        };
        let scanner = Scanner::new(&config).expect("scanner");
        let result = scanner.scan(&AnalysisCache::new()).expect("scan");

        let props = result
            .module(&scanner.root().join("ui/props.ts"))
            .expect("props");
        assert!(!props.is_type_only());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnresolvedReExport));
    }

    #[test]
    fn test_second_scan_uses_cache_and_forgets_deleted_files() {
        let (_dir, root) = setup();
        write(&root, "a.ts", "export const a = 1;");
        write(&root, "b.ts", "export const b = 2;");

        let config = GenerateConfig {
            root_path: root.clone(),
            ..GenerateConfig::default()
        };
        let scanner = Scanner::new(&config).expect("scanner");
        let cache = AnalysisCache::new();

        let first = scanner.scan(&cache).expect("first scan");
        assert_eq!(first.stats.parsed, 2);

        fs::remove_file(root.join("b.ts")).expect("remove b");
        let second = scanner.scan(&cache).expect("second scan");
        assert_eq!(second.stats.parsed, 0);
        assert_eq!(second.stats.cache_hits, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_a_warning() {
        let (_dir, root) = setup();
        write(&root, "broken.ts", "export const ok = 1;\nexport function (\n");

        let config = GenerateConfig {
            root_path: root.clone(),
            ..GenerateConfig::default()
        };
        let result = Scanner::new(&config)
            .expect("scanner")
            .scan(&AnalysisCache::new())
            .expect("scan");

        assert_eq!(result.stats.syntax_warnings, 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::SyntaxError));
    }
}
