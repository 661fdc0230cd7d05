//! Where scans get their files from.
//!
//! [`FileSource`] abstracts enumeration and reads so the engine can scan a
//! real directory tree ([`DiskSource`]) or an in-memory one
//! ([`MemorySource`]).

use std::io;

use camino::Utf8PathBuf;
use hl_core::{FxHashMap, Location, ScanConfig};
use parking_lot::RwLock;

use crate::error::ScanError;
use crate::walker::FileWalker;

/// File enumeration and reading for scope scans.
///
/// Implementations are called from blocking worker threads.
pub trait FileSource: Send + Sync + 'static {
    /// Files directly inside `folder`.
    ///
    /// # Errors
    ///
    /// Fails when `folder` itself cannot be enumerated.
    fn list_children(&self, folder: &Location) -> Result<Vec<Location>, ScanError>;

    /// Files anywhere below `folder`, excluding build and dependency
    /// directories, at most `max_files` of them.
    ///
    /// # Errors
    ///
    /// Fails when `folder` itself cannot be enumerated.
    fn walk(&self, folder: &Location, max_files: usize) -> Result<Vec<Location>, ScanError>;

    /// Full text of one file.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Read`] when the file cannot be read as UTF-8.
    fn read(&self, file: &Location) -> Result<String, ScanError>;
}

/// Reads scope files from the local file system.
#[derive(Debug, Clone, Default)]
pub struct DiskSource {
    config: ScanConfig,
}

impl DiskSource {
    /// Creates a source using the walk settings in `config`.
    #[must_use]
    pub const fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    fn walker(&self, folder: &Location) -> Result<FileWalker, ScanError> {
        let root = folder
            .to_file_path()
            .ok_or_else(|| ScanError::NotHierarchical(folder.to_string()))?;
        FileWalker::new(&root, &self.config)
    }
}

impl FileSource for DiskSource {
    fn list_children(&self, folder: &Location) -> Result<Vec<Location>, ScanError> {
        let paths = self.walker(folder)?.collect_paths()?;
        Ok(paths.iter().map(|p| Location::from_path(p)).collect())
    }

    fn walk(&self, folder: &Location, max_files: usize) -> Result<Vec<Location>, ScanError> {
        let paths = self
            .walker(folder)?
            .with_recursive(true)
            .with_max_files(max_files)
            .collect_paths()?;
        Ok(paths.iter().map(|p| Location::from_path(p)).collect())
    }

    fn read(&self, file: &Location) -> Result<String, ScanError> {
        let path = file
            .to_file_path()
            .ok_or_else(|| ScanError::NotHierarchical(file.to_string()))?;
        std::fs::read_to_string(&path).map_err(|e| ScanError::read(path, e))
    }
}

/// An in-memory file tree keyed by location.
///
/// # Examples
///
/// ```
/// use hl_core::Location;
/// use hl_scanner::{FileSource, MemorySource};
///
/// let source = MemorySource::new();
/// let file = Location::parse("mem:/w/a.txt").unwrap();
/// source.insert(file.clone(), "hello");
///
/// let folder = Location::parse("mem:/w").unwrap();
/// assert_eq!(source.list_children(&folder).unwrap(), vec![file.clone()]);
/// assert_eq!(source.read(&file).unwrap(), "hello");
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    files: RwLock<FxHashMap<Location, String>>,
}

impl MemorySource {
    /// Creates an empty tree.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&self, file: Location, text: impl Into<String>) {
        self.files.write().insert(file, text.into());
    }

    /// Removes a file, returning `true` if it existed.
    pub fn remove(&self, file: &Location) -> bool {
        self.files.write().remove(file).is_some()
    }

    fn collect(&self, keep: impl Fn(&Location) -> bool, max_files: usize) -> Vec<Location> {
        let mut found: Vec<Location> = self
            .files
            .read()
            .keys()
            .filter(|location| keep(location))
            .cloned()
            .collect();
        found.sort();
        found.truncate(max_files);
        found
    }
}

impl FileSource for MemorySource {
    fn list_children(&self, folder: &Location) -> Result<Vec<Location>, ScanError> {
        Ok(self.collect(
            |file| file.parent().is_some_and(|p| p.same_location(folder)),
            usize::MAX,
        ))
    }

    fn walk(&self, folder: &Location, max_files: usize) -> Result<Vec<Location>, ScanError> {
        Ok(self.collect(|file| file.is_descendant_of(folder), max_files))
    }

    fn read(&self, file: &Location) -> Result<String, ScanError> {
        self.files.read().get(file).cloned().ok_or_else(|| {
            ScanError::read(
                Utf8PathBuf::from(file.path()),
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            )
        })
    }
}
