//! Disk change watching for folder-scoped highlight rules.
//!
//! Detects file changes under a scope root with `notify`, debounces them
//! through `notify-debouncer-mini`, and streams them into tokio. The CLI
//! feeds each changed location to `Engine::file_changed_on_disk`, which
//! schedules coalesced rescans for the folder rules covering it.
//!
//! # Overview
//!
//! - [`FileWatcher`]: owns the blocking watcher thread and the event channel
//! - [`FileEvent`] / [`FileEventBatch`]: changed paths, batched on receipt
//! - [`EventFilter`]: predicates applied on the watcher thread
//!   ([`ExcludeDirsFilter`], [`GlobFilter`], [`CompositeFilter`])
//! - [`WatchError`]: startup and shutdown failures
//!
//! # Usage
//!
//! ```no_run
//! use camino::Utf8Path;
//! use hl_core::Config;
//! use hl_watcher::{CompositeFilter, ExcludeDirsFilter, FileWatcher};
//!
//! # async fn example() -> Result<(), hl_watcher::WatchError> {
//! let config = Config::default();
//! let filter = CompositeFilter::new().and(ExcludeDirsFilter::new(config.scan.exclude_dirs.clone()));
//! let mut watcher = FileWatcher::new(Utf8Path::new("./src"), &config.watch, filter)?;
//!
//! while let Some(batch) = watcher.recv_batch().await {
//!     println!("{} files changed", batch.locations().len());
//! }
//! watcher.shutdown().await
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod events;
mod filter;
mod watcher;

pub use error::WatchError;
pub use events::{FileEvent, FileEventBatch};
pub use filter::{AcceptAllFilter, CompositeFilter, EventFilter, ExcludeDirsFilter, GlobFilter};
pub use watcher::{DEFAULT_CHANNEL_CAPACITY, FileWatcher};
