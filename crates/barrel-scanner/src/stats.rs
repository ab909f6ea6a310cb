//! Scan statistics with atomic counters.
//!
//! All counters use [`AtomicU64`] with relaxed ordering; they are updated
//! from rayon workers and only read after the parallel phase.
//!
//! # Examples
//!
//! ```
//! use barrel_scanner::ScanStats;
//!
//! let stats = ScanStats::new();
//! stats.increment_parsed();
//! stats.increment_cache_hits();
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.analyzed(), 2);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Thread-safe counters for one scan.
#[derive(Debug, Default)]
pub struct ScanStats {
    parsed: AtomicU64,
    cache_hits: AtomicU64,
    syntax_warnings: AtomicU64,
    errors: AtomicU64,
}

impl ScanStats {
    /// Creates zeroed counters.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a file that was parsed.
    #[inline]
    pub fn increment_parsed(&self) {
        self.parsed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a file served from the analysis cache.
    #[inline]
    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a file that parsed with recovered syntax errors.
    #[inline]
    pub fn increment_syntax_warnings(&self) {
        self.syntax_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a file that could not be analyzed.
    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            parsed: self.parsed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            syntax_warnings: self.syntax_warnings.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of [`ScanStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files parsed in this scan.
    pub parsed: u64,
    /// Files reused from the cache.
    pub cache_hits: u64,
    /// Files with recovered syntax errors.
    pub syntax_warnings: u64,
    /// Files skipped because of read or parse errors.
    pub errors: u64,
}

impl StatsSnapshot {
    /// Files with an analysis available (parsed or cached).
    #[inline]
    #[must_use]
    pub const fn analyzed(&self) -> u64 {
        self.parsed + self.cache_hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes() {
        let stats = ScanStats::new();
        stats.increment_parsed();
        stats.increment_errors();
        let json = serde_json::to_string(&stats.snapshot()).expect("snapshot should serialize");
        assert!(json.contains("\"parsed\":1"));
        assert!(json.contains("\"errors\":1"));
    }
}
