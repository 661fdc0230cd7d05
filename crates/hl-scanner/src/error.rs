//! Errors raised while collecting and reading the files of a folder scope.

use camino::Utf8PathBuf;

/// Why a folder scope, or one file inside it, could not be scanned.
///
/// [`ScanError::Read`] and [`ScanError::NonUtf8Path`] concern a single
/// candidate: the scanner counts the file as failed and moves on. The
/// remaining variants abort the whole scan or, for
/// [`ScanError::InvalidFilter`], reject a rule edit before it applies.
///
/// # Examples
///
/// ```
/// use hl_scanner::ScanError;
///
/// let err = ScanError::missing_root("/work/gone");
/// assert_eq!(err.to_string(), "scope root /work/gone: does not exist");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scope root could not be enumerated.
    #[error("cannot list scope folder: {0}")]
    Walk(#[from] ignore::Error),

    /// A candidate file could not be read as UTF-8 text.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that was skipped.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory entry has a non UTF-8 name.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// One glob of a rule's file filter does not compile.
    #[error("invalid file filter pattern `{pattern}`: {source}")]
    InvalidFilter {
        /// The offending glob.
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// The scope target has no file system path.
    #[error("location is not a file system folder: {0}")]
    NotHierarchical(String),

    /// The scope root is missing or is not a directory.
    #[error("scope root {path}: {reason}")]
    InvalidRoot {
        /// Root as given.
        path: Utf8PathBuf,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The scan worker stopped before producing a report.
    #[error("scan worker failed: {0}")]
    WorkerFailed(String),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::InvalidFilter`] error.
    #[inline]
    pub fn invalid_filter(pattern: impl Into<String>, source: globset::Error) -> Self {
        Self::InvalidFilter {
            pattern: pattern.into(),
            source,
        }
    }

    /// A scope root that does not exist.
    #[inline]
    pub fn missing_root(path: impl Into<Utf8PathBuf>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: "does not exist",
        }
    }

    /// A scope root that is a file rather than a folder.
    #[inline]
    pub fn root_not_directory(path: impl Into<Utf8PathBuf>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: "is not a directory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_read_error_names_file() {
        let err = ScanError::read("/w/notes.txt", io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "cannot read /w/notes.txt: gone");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_filter_quotes_glob() {
        let source = globset::Glob::new("a[").unwrap_err();
        let err = ScanError::invalid_filter("a[", source);
        assert!(err.to_string().contains("`a[`"));
    }

    #[test]
    fn test_invalid_root_reasons() {
        assert_eq!(
            ScanError::root_not_directory("/w/a.txt").to_string(),
            "scope root /w/a.txt: is not a directory"
        );
        assert!(matches!(
            ScanError::missing_root("/w/gone"),
            ScanError::InvalidRoot { reason: "does not exist", .. }
        ));
    }
}
