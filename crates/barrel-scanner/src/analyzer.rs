//! Parallel module analysis using rayon and arena allocation.
//!
//! Uses the "collect-then-parallelize" pattern:
//!
//! 1. Paths are collected first by [`TreeWalker`](crate::TreeWalker)
//! 2. [`ModuleAnalyzer`] processes paths in parallel with `rayon::par_iter()`
//! 3. Per-thread state (parser + arena member) is initialized via `map_init()`
//! 4. Analyses are owned data, so nothing outlives the arena scope
//!
//! Files whose content hash matches a cache entry are not re-parsed.

use std::fs;

use barrel_core::{ParseStatus, SourceFile, content_hash};
use barrel_parser::{Bump, ParseError, TsParser};
use bumpalo_herd::Herd;
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cache::{AnalysisCache, CachedModule};
use crate::error::ScanError;
use crate::stats::ScanStats;

/// Parallel module analyzer.
///
/// Runs on rayon's global pool unless built with
/// [`with_max_jobs`](Self::with_max_jobs).
#[derive(Debug, Default)]
pub struct ModuleAnalyzer {
    pool: Option<ThreadPool>,
}

impl ModuleAnalyzer {
    /// Creates an analyzer on the global rayon pool.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an analyzer limited to `jobs` worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if the thread pool cannot be built.
    pub fn with_max_jobs(jobs: usize) -> Result<Self, ScanError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|index| format!("barrelgen-parse-{index}"))
            .build()
            .map_err(|err| ScanError::config(format!("failed to build thread pool: {err}")))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Analyzes `paths` in parallel.
    ///
    /// Results keep the order of `paths`. Successful analyses are inserted
    /// into `cache`; failures are returned per file and never stop the
    /// others.
    #[must_use]
    pub fn analyze_files(
        &self,
        paths: &[Utf8PathBuf],
        cache: &AnalysisCache,
        stats: &ScanStats,
    ) -> Vec<(Utf8PathBuf, Result<CachedModule, ScanError>)> {
        match &self.pool {
            Some(pool) => pool.install(|| analyze_parallel(paths, cache, stats)),
            None => analyze_parallel(paths, cache, stats),
        }
    }
}

fn analyze_parallel(
    paths: &[Utf8PathBuf],
    cache: &AnalysisCache,
    stats: &ScanStats,
) -> Vec<(Utf8PathBuf, Result<CachedModule, ScanError>)> {
    let herd = Herd::new();

    paths
        .par_iter()
        .map_init(
            || (TsParser::new().ok(), herd.get()),
            |(parser, member), path| {
                let result = analyze_file(path, parser.as_mut(), member.as_bump(), cache, stats);
                if result.is_err() {
                    stats.increment_errors();
                }
                (path.clone(), result)
            },
        )
        .collect()
}

fn analyze_file(
    path: &Utf8Path,
    parser: Option<&mut TsParser>,
    arena: &Bump,
    cache: &AnalysisCache,
    stats: &ScanStats,
) -> Result<CachedModule, ScanError> {
    let text = fs::read_to_string(path).map_err(|err| ScanError::read(path, err))?;

    if let Some(hit) = cache.lookup(path, content_hash(&text)) {
        stats.increment_cache_hits();
        return Ok(hit);
    }

    let parser = parser.ok_or_else(|| ScanError::parse(path, ParseError::LanguageInit))?;
    let analysis = parser
        .analyze_in(arena, path, &text)
        .map_err(|err| ScanError::parse(path, err))?;

    stats.increment_parsed();
    if analysis.status == ParseStatus::SyntaxWarning {
        stats.increment_syntax_warnings();
    }

    let file = SourceFile::new(path.to_owned(), text).with_status(analysis.status);
    let entry = CachedModule::new(file, analysis);
    cache.insert(entry.clone());
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use barrel_core::ExportKind;
    use tempfile::TempDir;

    use super::*;

    fn fixture(files: &[(&str, &str)]) -> (TempDir, Vec<Utf8PathBuf>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 tempdir");
        let paths = files
            .iter()
            .map(|(name, text)| {
                let path = root.join(name);
                fs::write(&path, text).expect("write fixture");
                path
            })
            .collect();
        (dir, paths)
    }

    #[test]
    fn test_analyze_files_in_order() {
        let (_dir, paths) = fixture(&[
            ("a.ts", "export interface A {}"),
            ("b.tsx", "export const B = () => <div />;"),
        ]);
        let cache = AnalysisCache::new();
        let stats = ScanStats::new();

        let results = ModuleAnalyzer::new().analyze_files(&paths, &cache, &stats);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, paths[0]);
        let a = results[0].1.as_ref().expect("a analyzed");
        assert_eq!(a.analysis.exports[0].kind, ExportKind::TypeOnly);
        let b = results[1].1.as_ref().expect("b analyzed");
        assert_eq!(b.analysis.exports[0].name, "B");
        assert_eq!(stats.snapshot().parsed, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_unchanged_file_is_cache_hit() {
        let (_dir, paths) = fixture(&[("a.ts", "export const a = 1;")]);
        let cache = AnalysisCache::new();
        let stats = ScanStats::new();
        let analyzer = ModuleAnalyzer::with_max_jobs(2).expect("pool");

        let _ = analyzer.analyze_files(&paths, &cache, &stats);
        let _ = analyzer.analyze_files(&paths, &cache, &stats);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.parsed, 1);
        assert_eq!(snapshot.cache_hits, 1);
    }

    #[test]
    fn test_changed_file_is_reparsed() {
        let (_dir, paths) = fixture(&[("a.ts", "export const a = 1;")]);
        let cache = AnalysisCache::new();
        let stats = ScanStats::new();
        let analyzer = ModuleAnalyzer::new();

        let _ = analyzer.analyze_files(&paths, &cache, &stats);
        fs::write(&paths[0], "export type a = number;").expect("rewrite");
        let results = analyzer.analyze_files(&paths, &cache, &stats);

        let entry = results[0].1.as_ref().expect("analyzed");
        assert!(entry.analysis.is_type_only());
        assert_eq!(stats.snapshot().parsed, 2);
    }

    #[test]
    fn test_missing_file_is_recoverable_error() {
        let (_dir, mut paths) = fixture(&[("a.ts", "export const a = 1;")]);
        paths.push(paths[0].with_file_name("gone.ts"));
        let cache = AnalysisCache::new();
        let stats = ScanStats::new();

        let results = ModuleAnalyzer::new().analyze_files(&paths, &cache, &stats);

        let err = results[1].1.as_ref().expect_err("missing file");
        assert!(err.is_recoverable());
        assert_eq!(stats.snapshot().errors, 1);
    }
}
