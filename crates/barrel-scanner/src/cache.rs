//! Content-addressed cache of module analyses.
//!
//! Entries survive across passes of one run. An entry is reused only when the
//! file's current content hash matches the hash it was analyzed at, and the
//! self-healing pass invalidates entries explicitly after rewriting a file.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use barrel_core::{ModuleAnalysis, SourceFile};
//! use barrel_scanner::{AnalysisCache, CachedModule};
//!
//! let cache = AnalysisCache::new();
//! let file = SourceFile::new("/src/a.ts".into(), "export const a = 1;".to_owned());
//! let analysis = ModuleAnalysis::new(file.path.clone(), file.content_hash);
//! cache.insert(CachedModule::new(file, analysis));
//!
//! let hash = barrel_core::content_hash("export const a = 1;");
//! assert!(cache.lookup("/src/a.ts".as_ref(), hash).is_some());
//! assert!(cache.lookup("/src/a.ts".as_ref(), hash ^ 1).is_none());
//! ```

use std::sync::Arc;

use barrel_core::{FxHashMap, ModuleAnalysis, SourceFile};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;

/// A source file together with its analysis.
#[derive(Debug, Clone)]
pub struct CachedModule {
    /// The file as read from disk.
    pub file: Arc<SourceFile>,

    /// Its raw (unsettled) analysis.
    pub analysis: Arc<ModuleAnalysis>,
}

impl CachedModule {
    /// Wraps a file and its analysis.
    #[must_use]
    pub fn new(file: SourceFile, analysis: ModuleAnalysis) -> Self {
        Self {
            file: Arc::new(file),
            analysis: Arc::new(analysis),
        }
    }

    /// Content hash the entry was analyzed at.
    #[inline]
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        self.file.content_hash
    }
}

/// Thread-safe analysis cache keyed by path.
///
/// Lookups clone the [`Arc`]s out of the map so no lock is held while the
/// caller works with an entry.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: RwLock<FxHashMap<Utf8PathBuf, CachedModule>>,
}

impl AnalysisCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `path` if it was analyzed at `content_hash`.
    #[must_use]
    pub fn lookup(&self, path: &Utf8Path, content_hash: u64) -> Option<CachedModule> {
        self.entries
            .read()
            .get(path)
            .filter(|entry| entry.content_hash() == content_hash)
            .cloned()
    }

    /// Returns the entry for `path` regardless of freshness.
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<CachedModule> {
        self.entries.read().get(path).cloned()
    }

    /// Inserts or replaces an entry.
    pub fn insert(&self, entry: CachedModule) {
        let path = entry.file.path.clone();
        self.entries.write().insert(path, entry);
    }

    /// Drops the entry for `path`. Returns `true` if one existed.
    pub fn invalidate(&self, path: &Utf8Path) -> bool {
        self.entries.write().remove(path).is_some()
    }

    /// Keeps only entries whose path satisfies `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&Utf8Path) -> bool) {
        self.entries.write().retain(|path, _| keep(path));
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, text: &str) -> CachedModule {
        let file = SourceFile::new(path.into(), text.to_owned());
        let analysis = ModuleAnalysis::new(file.path.clone(), file.content_hash);
        CachedModule::new(file, analysis)
    }

    #[test]
    fn test_invalidate_removes_entry() {
        let cache = AnalysisCache::new();
        cache.insert(entry("/a.ts", "x"));
        assert_eq!(cache.len(), 1);
        assert!(cache.invalidate(Utf8Path::new("/a.ts")));
        assert!(!cache.invalidate(Utf8Path::new("/a.ts")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_hash_misses() {
        let cache = AnalysisCache::new();
        cache.insert(entry("/a.ts", "old"));
        let fresh = barrel_core::content_hash("new");
        assert!(cache.lookup(Utf8Path::new("/a.ts"), fresh).is_none());
        assert!(cache.get(Utf8Path::new("/a.ts")).is_some());
    }

    #[test]
    fn test_retain_drops_deleted_files() {
        let cache = AnalysisCache::new();
        cache.insert(entry("/a.ts", "a"));
        cache.insert(entry("/b.ts", "b"));
        cache.retain(|p| p.as_str() == "/b.ts");
        assert_eq!(cache.len(), 1);
        assert!(cache.get(Utf8Path::new("/b.ts")).is_some());
    }
}
