//! File-name filters for rules.
//!
//! A filter is one or more glob patterns joined by separator characters
//! (`*.rs, *.md`). A file passes when its base name matches at least one
//! pattern.

use camino::Utf8Path;
use globset::{Glob, GlobSet, GlobSetBuilder};
use smallvec::SmallVec;

use crate::error::ScanError;

/// A compiled file-name filter.
///
/// # Examples
///
/// ```
/// use hl_scanner::FileFilter;
///
/// let filter = FileFilter::parse("*.rs; *.toml", ",;").unwrap().unwrap();
/// assert!(filter.matches_name("lib.rs"));
/// assert!(filter.matches_name("Cargo.toml"));
/// assert!(!filter.matches_name("README.md"));
///
/// // Blank input means "no filter".
/// assert!(FileFilter::parse(" , ", ",;").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FileFilter {
    source: String,
    globs: SmallVec<[String; 4]>,
    set: GlobSet,
}

impl FileFilter {
    /// Parses `input`, splitting on any character in `separators`.
    ///
    /// Returns `Ok(None)` when no pattern remains after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidFilter`] for the first glob that does not
    /// compile. The whole filter is rejected in that case.
    pub fn parse(input: &str, separators: &str) -> Result<Option<Self>, ScanError> {
        let globs: SmallVec<[String; 4]> = input
            .split(|c| separators.contains(c))
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        if globs.is_empty() {
            return Ok(None);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &globs {
            let glob = Glob::new(pattern).map_err(|e| ScanError::invalid_filter(pattern, e))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| ScanError::invalid_filter(input.trim(), e))?;

        Ok(Some(Self {
            source: input.trim().to_owned(),
            globs,
            set,
        }))
    }

    /// Returns `true` if a base name matches any pattern.
    #[inline]
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    /// Returns `true` if the base name of `path` matches any pattern.
    #[must_use]
    pub fn matches_path(&self, path: &Utf8Path) -> bool {
        path.file_name().is_some_and(|name| self.matches_name(name))
    }

    /// The filter text as the user entered it, trimmed.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The individual glob patterns.
    #[inline]
    #[must_use]
    pub fn globs(&self) -> &[String] {
        &self.globs
    }
}

impl PartialEq for FileFilter {
    fn eq(&self, other: &Self) -> bool {
        self.globs == other.globs
    }
}

impl Eq for FileFilter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_separators() {
        let filter = FileFilter::parse("*.rs,*.md ; Makefile", ",;").unwrap().unwrap();
        assert_eq!(filter.globs(), ["*.rs", "*.md", "Makefile"]);
        assert_eq!(filter.as_str(), "*.rs,*.md ; Makefile");
    }

    #[test]
    fn test_matches_base_name_only() {
        let filter = FileFilter::parse("*.rs", ",;").unwrap().unwrap();
        assert!(filter.matches_path(Utf8Path::new("/w/src/deep/lib.rs")));
        assert!(!filter.matches_path(Utf8Path::new("/w/src.rs/lib.md")));
    }

    #[test]
    fn test_literal_name() {
        let filter = FileFilter::parse("Cargo.toml", ",").unwrap().unwrap();
        assert!(filter.matches_name("Cargo.toml"));
        assert!(!filter.matches_name("cargo.toml.bak"));
    }

    #[test]
    fn test_empty_filter_is_none() {
        assert!(FileFilter::parse("", ",;").unwrap().is_none());
        assert!(FileFilter::parse("  ;; ", ",;").unwrap().is_none());
    }

    #[test]
    fn test_any_invalid_glob_rejects_filter() {
        let err = FileFilter::parse("*.rs, a[", ",;").unwrap_err();
        assert!(matches!(err, ScanError::InvalidFilter { ref pattern, .. } if pattern == "a["));
        assert!(FileFilter::parse("{a,", ",;").is_err());
    }

    #[test]
    fn test_equality_ignores_spacing() {
        let a = FileFilter::parse("*.rs,*.md", ",").unwrap().unwrap();
        let b = FileFilter::parse(" *.rs , *.md ", ",").unwrap().unwrap();
        assert_eq!(a, b);
    }
}
