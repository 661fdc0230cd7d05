//! Directory traversal for scope scans.
//!
//! This module provides [`FileWalker`], which uses the `ignore` crate to
//! enumerate the files a folder scope covers.
//!
//! # Features
//!
//! - Immediate children only, or a recursive walk
//! - Prunes excluded directories (`node_modules`, `.git`, `target`, ...)
//!   before descending into them
//! - Optionally respects `.gitignore` and `.ignore` patterns
//! - Stops after a configured number of files
//! - Converts paths to UTF-8 [`Utf8PathBuf`](camino::Utf8PathBuf)
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use hl_core::ScanConfig;
//! use hl_scanner::FileWalker;
//!
//! let walker = FileWalker::new(Utf8Path::new("/path/to/project"), &ScanConfig::default())?
//!     .with_recursive(true);
//! for path in walker.collect_paths()? {
//!     println!("Found: {path}");
//! }
//! # Ok::<(), hl_scanner::ScanError>(())
//! ```

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use hl_core::ScanConfig;
use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::error::ScanError;

/// A file walker over one scope folder.
///
/// Collects paths single-threaded; matching is parallelized afterwards.
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Directory names never descended into.
    skip_dirs: Arc<[String]>,
    /// Whether to descend below the root.
    recursive: bool,
    /// Upper bound on collected files.
    max_files: usize,
    /// Whether to follow symbolic links.
    follow_links: bool,
    /// Whether ignore files prune the walk.
    respect_gitignore: bool,
}

impl FileWalker {
    /// Creates a walker for `root` using the scan settings in `config`.
    ///
    /// The walker starts out non-recursive.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidRoot`] if the root path doesn't exist or
    /// isn't a directory.
    pub fn new(root: &Utf8Path, config: &ScanConfig) -> Result<Self, ScanError> {
        if !root.exists() {
            return Err(ScanError::missing_root(root));
        }
        if !root.is_dir() {
            return Err(ScanError::root_not_directory(root));
        }

        Ok(Self {
            root: root.to_owned(),
            skip_dirs: config.exclude_dirs.iter().cloned().collect(),
            recursive: false,
            max_files: config.max_files,
            follow_links: config.follow_links,
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Configures whether to walk below the root.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Overrides the file cap.
    #[must_use]
    pub const fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Collects file paths under the root, sorted by path.
    ///
    /// Entries that cannot be read or whose paths are not UTF-8 are logged
    /// and skipped. Collection stops once the file cap is reached.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if the root itself cannot be read.
    pub fn collect_paths(&self) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) if paths.is_empty() && e.depth().is_none_or(|d| d == 0) => {
                    return Err(ScanError::Walk(e));
                }
                Err(e) => {
                    warn!(root = %self.root, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                let err = ScanError::NonUtf8Path(entry.path().to_owned());
                warn!(error = %err, "Skipping entry");
                continue;
            };

            if self.should_skip_path(path) {
                continue;
            }

            if paths.len() >= self.max_files {
                debug!(root = %self.root, cap = self.max_files, "File cap reached");
                break;
            }
            paths.push(path.to_owned());
        }

        paths.sort();
        Ok(paths)
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        let skip_dirs = Arc::clone(&self.skip_dirs);
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .parents(self.respect_gitignore)
            .follow_links(self.follow_links)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                entry.depth() == 0
                    || !is_dir
                    || entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !skip_dirs.iter().any(|d| d == name))
            });
        if !self.recursive {
            builder.max_depth(Some(1));
        }
        builder.build()
    }

    /// Checks if a path lies in an excluded directory below the root.
    fn should_skip_path(&self, path: &Utf8Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut components = relative.components().peekable();
        while let Some(component) = components.next() {
            // The last component is the file itself.
            if components.peek().is_none() {
                break;
            }
            if self.skip_dirs.iter().any(|d| d == component.as_str()) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        for file in [
            "a.rs",
            "b.md",
            "sub/c.rs",
            "sub/deeper/d.rs",
            "node_modules/pkg/index.js",
            "target/debug/out.rs",
            ".hidden/e.rs",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "content").unwrap();
        }
        (dir, root)
    }

    fn relative(root: &Utf8Path, paths: &[Utf8PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().as_str().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_immediate_children_only() {
        let (_dir, root) = tree();
        let walker = FileWalker::new(&root, &ScanConfig::default()).unwrap();
        let paths = walker.collect_paths().unwrap();
        assert_eq!(relative(&root, &paths), vec!["a.rs", "b.md"]);
    }

    #[test]
    fn test_recursive_walk_skips_excluded_dirs() {
        let (_dir, root) = tree();
        let walker = FileWalker::new(&root, &ScanConfig::default())
            .unwrap()
            .with_recursive(true);
        let paths = relative(&root, &walker.collect_paths().unwrap());
        assert!(paths.contains(&"sub/c.rs".to_owned()));
        assert!(paths.contains(&"sub/deeper/d.rs".to_owned()));
        assert!(paths.contains(&".hidden/e.rs".to_owned()));
        assert!(!paths.iter().any(|p| p.starts_with("node_modules")));
        assert!(!paths.iter().any(|p| p.starts_with("target")));
    }

    #[test]
    fn test_file_cap() {
        let (_dir, root) = tree();
        let walker = FileWalker::new(&root, &ScanConfig::default())
            .unwrap()
            .with_recursive(true)
            .with_max_files(2);
        assert_eq!(walker.collect_paths().unwrap().len(), 2);
    }

    #[test]
    fn test_configured_exclude_dirs() {
        let (_dir, root) = tree();
        let config = ScanConfig {
            exclude_dirs: vec!["deeper".to_owned()],
            ..ScanConfig::default()
        };
        let walker = FileWalker::new(&root, &config).unwrap().with_recursive(true);
        let paths = relative(&root, &walker.collect_paths().unwrap());
        assert!(paths.contains(&"sub/c.rs".to_owned()));
        assert!(!paths.contains(&"sub/deeper/d.rs".to_owned()));
    }

    #[test]
    fn test_root_inside_excluded_name_is_walked() {
        let (_dir, root) = tree();
        let build = root.join("target");
        let walker = FileWalker::new(&build, &ScanConfig::default())
            .unwrap()
            .with_recursive(true);
        assert_eq!(walker.collect_paths().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let (_dir, root) = tree();
        let err = FileWalker::new(&root.join("missing"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRoot { .. }));
    }

    #[test]
    fn test_should_skip_path() {
        let walker = FileWalker {
            root: Utf8PathBuf::from("/w"),
            skip_dirs: vec!["custom_skip".to_owned()].into(),
            recursive: true,
            max_files: 10,
            follow_links: false,
            respect_gitignore: true,
        };
        assert!(walker.should_skip_path(Utf8Path::new("/w/custom_skip/foo.rs")));
        assert!(walker.should_skip_path(Utf8Path::new("/w/src/custom_skip/bar.rs")));
        assert!(!walker.should_skip_path(Utf8Path::new("/w/src/foo.rs")));
        assert!(!walker.should_skip_path(Utf8Path::new("/w/custom_skip")));
    }
}
