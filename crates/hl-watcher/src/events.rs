//! Debounced change events.
//!
//! The debouncer does not say whether a file was created, modified, or
//! removed; consumers rescan whatever scope covers the path.

use std::time::Instant;

use camino::Utf8PathBuf;
use hl_core::Location;
use smallvec::SmallVec;

/// One changed path, guaranteed UTF-8.
///
/// # Examples
///
/// ```
/// use camino::Utf8PathBuf;
/// use hl_watcher::FileEvent;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/w/src/lib.rs"));
/// assert_eq!(event.file_name(), Some("lib.rs"));
/// assert_eq!(event.location().as_str(), "file:///w/src/lib.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the changed file or directory.
    pub path: Utf8PathBuf,

    /// When the debounced event was delivered.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates an event stamped now.
    #[inline]
    #[must_use]
    pub fn new(path: Utf8PathBuf) -> Self {
        Self {
            path,
            timestamp: Instant::now(),
        }
    }

    /// The changed path as a `file` location.
    #[must_use]
    pub fn location(&self) -> Location {
        Location::from_path(&self.path)
    }

    /// Base name of the changed path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// Events drained from the watcher together.
///
/// Inline storage covers the common case of a save touching a few files.
#[derive(Debug, Clone)]
pub struct FileEventBatch {
    /// The events, in arrival order.
    pub events: SmallVec<[FileEvent; 8]>,

    /// When the batch was started.
    pub received_at: Instant,
}

impl FileEventBatch {
    /// Creates an empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: SmallVec::new(),
            received_at: Instant::now(),
        }
    }

    /// Adds an event.
    #[inline]
    pub fn push(&mut self, event: FileEvent) {
        self.events.push(event);
    }

    /// Number of events, duplicates included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the batch holds no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &FileEvent> {
        self.events.iter()
    }

    /// Distinct changed locations, sorted.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = self.events.iter().map(FileEvent::location).collect();
        locations.sort_unstable();
        locations.dedup();
        locations
    }
}

impl Default for FileEventBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<FileEvent> for FileEventBatch {
    fn from_iter<T: IntoIterator<Item = FileEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
            received_at: Instant::now(),
        }
    }
}

impl IntoIterator for FileEventBatch {
    type Item = FileEvent;
    type IntoIter = smallvec::IntoIter<[FileEvent; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
