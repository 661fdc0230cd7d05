//! Filtering of change events before they reach the channel.
//!
//! Filters run on the blocking watcher thread, so rejected events never
//! cross into the async side.
//!
//! # Examples
//!
//! ```
//! use camino::Utf8Path;
//! use hl_watcher::{CompositeFilter, EventFilter, ExcludeDirsFilter, GlobFilter};
//!
//! let filter = CompositeFilter::new()
//!     .and(ExcludeDirsFilter::new(["node_modules", ".git"]))
//!     .and(GlobFilter::parse("*.rs", ",;").unwrap().unwrap());
//!
//! assert!(filter.should_process(Utf8Path::new("/w/src/lib.rs")));
//! assert!(!filter.should_process(Utf8Path::new("/w/node_modules/x/lib.rs")));
//! assert!(!filter.should_process(Utf8Path::new("/w/README.md")));
//! ```

use camino::Utf8Path;
use hl_core::FxHashSet;
use hl_scanner::{FileFilter, ScanError};

/// Decides which changed paths are forwarded.
///
/// Filters must be `Send + Sync + 'static`: they move onto the blocking
/// watcher thread.
pub trait EventFilter: Send + Sync + 'static {
    /// Returns `true` if a change to `path` should be delivered.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Forwards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl EventFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Drops events under excluded directory names such as `node_modules`.
///
/// Any path component matching an excluded name rejects the event, the same
/// names the scope walker skips.
#[derive(Debug, Clone, Default)]
pub struct ExcludeDirsFilter {
    names: FxHashSet<String>,
}

impl ExcludeDirsFilter {
    /// Creates a filter excluding `names`.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl EventFilter for ExcludeDirsFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        !path
            .components()
            .any(|component| self.names.contains(component.as_str()))
    }
}

/// Forwards events whose base name matches a rule's file filter.
#[derive(Debug, Clone)]
pub struct GlobFilter {
    filter: FileFilter,
}

impl GlobFilter {
    /// Wraps an already parsed filter.
    #[must_use]
    pub const fn new(filter: FileFilter) -> Self {
        Self { filter }
    }

    /// Parses glob patterns separated by any character in `separators`.
    ///
    /// Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidFilter`] if any glob does not compile.
    pub fn parse(input: &str, separators: &str) -> Result<Option<Self>, ScanError> {
        Ok(FileFilter::parse(input, separators)?.map(Self::new))
    }
}

impl EventFilter for GlobFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filter.matches_path(path)
    }
}

/// Requires every contained filter to accept. Empty accepts everything.
#[derive(Default)]
pub struct CompositeFilter {
    filters: Vec<Box<dyn EventFilter>>,
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl CompositeFilter {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter.
    #[must_use]
    pub fn and<F: EventFilter>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Adds a filter if one is given.
    #[must_use]
    pub fn and_maybe<F: EventFilter>(self, filter: Option<F>) -> Self {
        match filter {
            Some(filter) => self.and(filter),
            None => self,
        }
    }
}

impl EventFilter for CompositeFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.filters.iter().all(|f| f.should_process(path))
    }
}

impl<F: EventFilter + ?Sized> EventFilter for Box<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

impl<F: EventFilter + ?Sized> EventFilter for std::sync::Arc<F> {
    fn should_process(&self, path: &Utf8Path) -> bool {
        (**self).should_process(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new("")));
        assert!(AcceptAllFilter.should_process(Utf8Path::new("/w/a.bin")));
    }

    #[test]
    fn test_exclude_dirs_matches_whole_components() {
        let filter = ExcludeDirsFilter::new(["target", ".git"]);
        assert!(!filter.should_process(Utf8Path::new("/w/target/debug/a.rs")));
        assert!(!filter.should_process(Utf8Path::new("/w/.git/HEAD")));
        assert!(filter.should_process(Utf8Path::new("/w/targets/a.rs")));
        assert!(filter.should_process(Utf8Path::new("/w/src/a.rs")));
    }

    #[test]
    fn test_glob_filter() {
        let filter = GlobFilter::parse("*.rs; *.toml", ",;").unwrap().unwrap();
        assert!(filter.should_process(Utf8Path::new("/w/Cargo.toml")));
        assert!(filter.should_process(Utf8Path::new("/w/src/main.rs")));
        assert!(!filter.should_process(Utf8Path::new("/w/README.md")));
        assert!(GlobFilter::parse("  ", ",;").unwrap().is_none());
        assert!(GlobFilter::parse("a[", ",;").is_err());
    }

    #[test]
    fn test_composite_requires_all() {
        let filter = CompositeFilter::new()
            .and(ExcludeDirsFilter::new(["node_modules"]))
            .and_maybe(GlobFilter::parse("*.md", ",").unwrap());
        assert!(filter.should_process(Utf8Path::new("/w/a.md")));
        assert!(!filter.should_process(Utf8Path::new("/w/a.rs")));
        assert!(!filter.should_process(Utf8Path::new("/w/node_modules/a.md")));
        assert!(CompositeFilter::new().should_process(Utf8Path::new("/w/x")));
    }

    #[test]
    fn test_shared_filters() {
        let boxed: Box<dyn EventFilter> = Box::new(ExcludeDirsFilter::new(["out"]));
        assert!(!boxed.should_process(Utf8Path::new("/w/out/a")));
        let shared = std::sync::Arc::new(AcceptAllFilter);
        assert!(shared.should_process(Utf8Path::new("/w/out/a")));
    }
}
