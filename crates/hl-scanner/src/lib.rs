//! Folder scope scanning for highlight rules.
//!
//! This crate finds every match of one rule across the files a folder
//! scope covers. It enumerates candidates, applies the rule's file filter,
//! and matches file contents in parallel.
//!
//! # Overview
//!
//! The main entry point is [`ScopeScanner`], which combines:
//!
//! - [`FileSource`]: enumeration and reads ([`DiskSource`] walks the disk
//!   with [`FileWalker`]; [`MemorySource`] serves an in-memory tree)
//! - [`FileFilter`]: base-name glob filter parsed from a rule
//! - [`WordResolver`]: per-file language word pattern for whole-word rules,
//!   falling back to the request's separators
//! - [`ScanStats`]: atomic counters updated from rayon workers
//! - [`ScanTracker`]: the per-rule coalescing state machine callers use to
//!   keep at most one scan in flight and one queued
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hl_core::{Location, RuleId, RuleOptions, ScopeKey};
//! use hl_matcher::{SeparatorSet, compile};
//! use hl_scanner::{MemorySource, ScanRequest, ScopeScanner};
//!
//! let source = Arc::new(MemorySource::new());
//! source.insert(Location::parse("mem:/w/a.txt").unwrap(), "cat cat");
//! source.insert(Location::parse("mem:/w/b.txt").unwrap(), "dog");
//!
//! let request = ScanRequest {
//!     rule: RuleId::new(1),
//!     revision: 0,
//!     key: ScopeKey::folder(Location::parse("mem:/w").unwrap(), false),
//!     matcher: compile("cat", RuleOptions::default()).unwrap(),
//!     filter: None,
//!     separators: SeparatorSet::default(),
//!     words: None,
//! };
//!
//! let report = ScopeScanner::new(source, 5000).perform_scan(&request).unwrap();
//! assert_eq!(report.files.len(), 1);
//! assert_eq!(report.stats.matches, 2);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ScopeScanner::perform_scan
//!     │
//!     ├── FileSource (list children / bounded walk)
//!     │       │
//!     │       └── FileWalker (ignore crate)
//!     │
//!     ├── FileFilter (globset, base names)
//!     │
//!     └── rayon par_iter: read + find_matches per file
//!             │
//!             └── ScanStats (atomic counters)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod coalesce;
mod error;
mod filter;
mod source;
mod stats;
mod walker;

pub use coalesce::{FinishOutcome, RequestOutcome, ScanState, ScanTracker};
pub use error::ScanError;
pub use filter::FileFilter;
pub use source::{DiskSource, FileSource, MemorySource};
pub use stats::{ScanStats, StatsSnapshot};
pub use walker::FileWalker;

use std::sync::Arc;

use hl_core::{Location, RuleId, Scope, ScopeKey, TextRange};
use hl_matcher::{CompiledMatcher, LanguageWords, SeparatorSet, WordPolicy, find_matches};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Looks up the language word pattern of a file read during a scan.
///
/// Called from rayon workers, so implementations must be thread-safe and
/// must not block on anything the scan's caller holds.
pub trait WordResolver: Send + Sync + std::fmt::Debug {
    /// The word pattern of `file`'s language, if it has one.
    fn words_for(&self, file: &Location) -> Option<Arc<LanguageWords>>;
}

/// Everything a scan needs, captured from the rule when it was scheduled.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// The rule being scanned.
    pub rule: RuleId,
    /// The rule revision the request was built from.
    pub revision: u64,
    /// Scope and target folder.
    pub key: ScopeKey,
    /// Compiled pattern.
    pub matcher: CompiledMatcher,
    /// Optional base-name filter.
    pub filter: Option<FileFilter>,
    /// Whole-word fallback for files without a language word pattern.
    pub separators: SeparatorSet,
    /// Per-file language word patterns for whole-word rules.
    pub words: Option<Arc<dyn WordResolver>>,
}

/// Matches found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatches {
    /// The file.
    pub location: Location,
    /// Match ranges, ascending.
    pub ranges: Vec<TextRange>,
}

/// Result of one completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// The rule that was scanned.
    pub rule: RuleId,
    /// Revision from the request.
    pub revision: u64,
    /// Files with at least one match, ordered by location.
    pub files: Vec<FileMatches>,
    /// Counters for the scan.
    pub stats: StatsSnapshot,
}

/// Runs scope scans against a [`FileSource`].
///
/// `ScopeScanner` is cheaply cloneable; clones share the source.
#[derive(Clone)]
pub struct ScopeScanner {
    source: Arc<dyn FileSource>,
    max_files: usize,
}

impl std::fmt::Debug for ScopeScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeScanner")
            .field("max_files", &self.max_files)
            .finish_non_exhaustive()
    }
}

impl ScopeScanner {
    /// Creates a scanner over `source`, capping recursive walks at
    /// `max_files`.
    #[must_use]
    pub fn new(source: Arc<dyn FileSource>, max_files: usize) -> Self {
        Self { source, max_files }
    }

    /// The underlying file source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &Arc<dyn FileSource> {
        &self.source
    }

    /// Scans every file the request's scope covers.
    ///
    /// Blocking: call from a blocking worker. Document scope yields an empty
    /// report. Files that cannot be read are logged, counted as failed, and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error only when the scope folder itself cannot be
    /// enumerated.
    pub fn perform_scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let folder = &request.key.target;
        let candidates = match request.key.scope {
            Scope::Document => Vec::new(),
            Scope::Folder => self.source.list_children(folder)?,
            Scope::FolderRecursive => self.source.walk(folder, self.max_files)?,
        };

        let candidates: Vec<Location> = match &request.filter {
            Some(filter) => candidates
                .into_iter()
                .filter(|c| c.file_name().is_some_and(|name| filter.matches_name(name)))
                .collect(),
            None => candidates,
        };

        debug!(
            rule = %request.rule,
            scope = %request.key,
            count = candidates.len(),
            "Collected scan candidates"
        );

        let stats = ScanStats::new();
        let mut files: Vec<FileMatches> = candidates
            .par_iter()
            .filter_map(|location| {
                stats.increment_considered();
                match self.source.read(location) {
                    Ok(text) => {
                        let language = request
                            .words
                            .as_ref()
                            .filter(|_| request.matcher.whole_word())
                            .and_then(|words| words.words_for(location));
                        let policy = match &language {
                            Some(language) => WordPolicy::Language(language),
                            None => WordPolicy::Separators(&request.separators),
                        };
                        let ranges = find_matches(&text, &request.matcher, &policy);
                        stats.record_matches(ranges.len());
                        (!ranges.is_empty()).then(|| FileMatches {
                            location: location.clone(),
                            ranges,
                        })
                    }
                    Err(e) => {
                        stats.increment_failed();
                        warn!(rule = %request.rule, file = %location, error = %e, "Skipping file");
                        None
                    }
                }
            })
            .collect();
        files.sort_by(|a, b| a.location.cmp(&b.location));

        let stats = stats.snapshot();
        info!(
            rule = %request.rule,
            scope = %request.key,
            files = stats.files_considered,
            matched = stats.files_matched,
            matches = stats.matches,
            failed = stats.files_failed,
            "Scan completed"
        );

        Ok(ScanReport {
            rule: request.rule,
            revision: request.revision,
            files,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use hl_core::{RuleOptions, ScanConfig};
    use hl_matcher::compile;
    use std::fs;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn request(key: ScopeKey, pattern: &str, filter: Option<&str>) -> ScanRequest {
        ScanRequest {
            rule: RuleId::new(1),
            revision: 3,
            key,
            matcher: compile(pattern, RuleOptions::default()).unwrap(),
            filter: filter.and_then(|f| FileFilter::parse(f, ",;").unwrap()),
            separators: SeparatorSet::default(),
            words: None,
        }
    }

    /// Treats every `.lisp` file as having hyphenated words.
    #[derive(Debug)]
    struct LispWords(Arc<LanguageWords>);

    impl WordResolver for LispWords {
        fn words_for(&self, file: &Location) -> Option<Arc<LanguageWords>> {
            file.as_str()
                .ends_with(".lisp")
                .then(|| Arc::clone(&self.0))
        }
    }

    fn memory_tree() -> Arc<MemorySource> {
        let source = Arc::new(MemorySource::new());
        source.insert(loc("mem:/w/b.rs"), "todo todo");
        source.insert(loc("mem:/w/a.md"), "TODO");
        source.insert(loc("mem:/w/none.rs"), "nothing");
        source.insert(loc("mem:/w/sub/c.rs"), "todo");
        source
    }

    #[test]
    fn test_folder_scan_is_shallow_and_ordered() {
        let scanner = ScopeScanner::new(memory_tree(), 100);
        let report = scanner
            .perform_scan(&request(ScopeKey::folder(loc("mem:/w"), false), "todo", None))
            .unwrap();
        let files: Vec<&str> = report.files.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(files, vec!["mem:/w/a.md", "mem:/w/b.rs"]);
        assert_eq!(report.stats.files_considered, 3);
        assert_eq!(report.stats.matches, 3);
        assert_eq!(report.revision, 3);
    }

    #[test]
    fn test_recursive_scan_with_filter() {
        let scanner = ScopeScanner::new(memory_tree(), 100);
        let report = scanner
            .perform_scan(&request(
                ScopeKey::folder(loc("mem:/w"), true),
                "todo",
                Some("*.rs"),
            ))
            .unwrap();
        let files: Vec<&str> = report.files.iter().map(|f| f.location.as_str()).collect();
        assert_eq!(files, vec!["mem:/w/b.rs", "mem:/w/sub/c.rs"]);
        assert_eq!(report.files[0].ranges, vec![TextRange::new(0, 4), TextRange::new(5, 9)]);
    }

    #[test]
    fn test_document_scope_is_empty() {
        let scanner = ScopeScanner::new(memory_tree(), 100);
        let report = scanner
            .perform_scan(&request(ScopeKey::document(loc("mem:/w/b.rs")), "todo", None))
            .unwrap();
        assert!(report.files.is_empty());
        assert_eq!(report.stats, StatsSnapshot::default());
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        fs::write(root.join("good.txt"), "needle").unwrap();
        fs::write(root.join("bad.txt"), [0xff, 0xfe, 0xfd]).unwrap();

        let scanner = ScopeScanner::new(Arc::new(DiskSource::new(ScanConfig::default())), 100);
        let report = scanner
            .perform_scan(&request(
                ScopeKey::folder(Location::from_path(&root), false),
                "needle",
                None,
            ))
            .unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.stats.files_failed, 1);
        assert_eq!(report.stats.files_considered, 2);
    }

    #[test]
    fn test_missing_folder_fails_scan() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().join("gone")).unwrap();
        let scanner = ScopeScanner::new(Arc::new(DiskSource::default()), 100);
        let result = scanner.perform_scan(&request(
            ScopeKey::folder(Location::from_path(&root), true),
            "x",
            None,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_whole_word_uses_file_language() {
        let source = Arc::new(MemorySource::new());
        source.insert(loc("mem:/w/a.lisp"), "foo-bar foo");
        source.insert(loc("mem:/w/b.txt"), "foo-bar foo");
        let scanner = ScopeScanner::new(source, 100);

        let whole_word = RuleOptions {
            whole_word: true,
            ..RuleOptions::default()
        };
        let mut request = request(ScopeKey::folder(loc("mem:/w"), false), "foo", None);
        request.matcher = compile("foo", whole_word).unwrap();
        request.words = Some(Arc::new(LispWords(Arc::new(
            LanguageWords::compile(r"[\w-]+").unwrap(),
        ))));

        let report = scanner.perform_scan(&request).unwrap();
        assert_eq!(report.files[0].location, loc("mem:/w/a.lisp"));
        assert_eq!(report.files[0].ranges, vec![TextRange::new(8, 11)]);
        // No language for `.txt`: `-` separates words.
        assert_eq!(
            report.files[1].ranges,
            vec![TextRange::new(0, 3), TextRange::new(8, 11)]
        );
    }
}
