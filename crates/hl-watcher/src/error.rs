//! Failures of a scope-root watcher.

use camino::Utf8PathBuf;

/// Why a [`FileWatcher`](crate::FileWatcher) could not start or stopped.
///
/// A changed path that is not UTF-8 is logged and dropped inside the
/// watcher thread; every other variant ends the watch.
///
/// # Examples
///
/// ```
/// use hl_watcher::WatchError;
///
/// let err = WatchError::root_not_found("/missing/root");
/// assert_eq!(err.to_string(), "watch root does not exist: /missing/root");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The scope root handed to the watcher does not exist.
    #[error("watch root does not exist: {0}")]
    RootNotFound(Utf8PathBuf),

    /// The scope root exists but could not be canonicalized.
    #[error("cannot resolve watch root {path}: {source}")]
    Canonicalize {
        /// Root as given.
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The notify debouncer refused to start or to watch the root.
    #[error("file notification backend failed: {0}")]
    Backend(#[from] notify::Error),

    /// The blocking watcher thread panicked or was cancelled.
    #[error("watcher thread failed: {0}")]
    Thread(#[from] tokio::task::JoinError),

    /// A changed path is not valid UTF-8.
    #[error("changed path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl WatchError {
    /// Creates a new [`WatchError::RootNotFound`] error.
    #[inline]
    pub fn root_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::RootNotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_root_not_found_message() {
        let err = WatchError::root_not_found("/w/missing");
        assert_eq!(err.to_string(), "watch root does not exist: /w/missing");
    }

    #[test]
    fn test_canonicalize_keeps_source() {
        let err = WatchError::Canonicalize {
            path: Utf8PathBuf::from("/w/loop"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("cannot resolve watch root /w/loop"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_non_utf8_message() {
        let err = WatchError::NonUtf8Path(PathBuf::from("bad"));
        assert!(err.to_string().contains("not valid UTF-8"));
    }
}
