//! Scan statistics with atomic counters.
//!
//! This module provides [`ScanStats`], incremented from rayon workers while a
//! scan runs, and [`StatsSnapshot`] for point-in-time views.
//!
//! # Thread Safety
//!
//! All counters use [`AtomicU64`] with [`Relaxed`](std::sync::atomic::Ordering::Relaxed)
//! ordering. Statistics are informational and don't require strict ordering.
//!
//! # Examples
//!
//! ```
//! use hl_scanner::ScanStats;
//!
//! let stats = ScanStats::new();
//! stats.increment_considered();
//! stats.record_matches(3);
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.files_matched, 1);
//! assert_eq!(snapshot.matches, 3);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for one scan.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Files that passed the filter and were read.
    considered: AtomicU64,
    /// Files with at least one match.
    matched: AtomicU64,
    /// Total match ranges.
    matches: AtomicU64,
    /// Files that could not be read.
    failed: AtomicU64,
}

impl ScanStats {
    /// Creates a new [`ScanStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the considered files counter.
    #[inline]
    pub fn increment_considered(&self) {
        self.considered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one file with `count` matches. Zero is ignored.
    #[inline]
    pub fn record_matches(&self, count: usize) {
        if count > 0 {
            self.matched.fetch_add(1, Ordering::Relaxed);
            self.matches.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    /// Increments the failed files counter.
    #[inline]
    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all statistics.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            files_considered: self.considered.load(Ordering::Relaxed),
            files_matched: self.matched.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            files_failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of scan statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Files that passed the filter.
    pub files_considered: u64,
    /// Files with at least one match.
    pub files_matched: u64,
    /// Total match ranges.
    pub matches: u64,
    /// Files skipped because they could not be read.
    pub files_failed: u64,
}

impl StatsSnapshot {
    /// Returns `true` if any file failed.
    #[inline]
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}
