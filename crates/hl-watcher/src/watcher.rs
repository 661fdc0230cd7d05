//! The notify/debouncer bridge.
//!
//! ```text
//!  spawn_blocking                          tokio
//! ┌──────────────────────────────┐       ┌──────────────────────────┐
//! │ RecommendedWatcher           │       │ FileWatcher              │
//! │   └─ Debouncer (debounce_ms) │       │   recv() / recv_batch()  │
//! │        └─ EventFilter        │ ────▶ │   mpsc::Receiver         │
//! └──────────────────────────────┘ send  └──────────────────────────┘
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use hl_core::WatchConfig;
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::WatchError;
use crate::events::{FileEvent, FileEventBatch};
use crate::filter::EventFilter;

/// Capacity of the event channel used by [`FileWatcher::new`].
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Watches a scope root and streams debounced change events.
///
/// The notify watcher runs on tokio's blocking pool until
/// [`FileWatcher::shutdown`] is called or the watcher is dropped.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use hl_core::WatchConfig;
/// use hl_watcher::{AcceptAllFilter, FileWatcher};
///
/// # async fn example() -> Result<(), hl_watcher::WatchError> {
/// let mut watcher =
///     FileWatcher::new(Utf8Path::new("./src"), &WatchConfig::default(), AcceptAllFilter)?;
///
/// while let Some(batch) = watcher.recv_batch().await {
///     for location in batch.locations() {
///         println!("changed: {location}");
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,
    event_rx: mpsc::Receiver<FileEvent>,
    root: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("root", &self.root)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Starts watching `path`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RootNotFound`] if the path does not exist and
    /// [`WatchError::Canonicalize`] if it cannot be resolved. Failures of the
    /// notify backend itself surface from [`FileWatcher::shutdown`].
    pub fn new<F: EventFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Starts watching `path` with a custom event channel capacity.
    ///
    /// # Errors
    ///
    /// As [`FileWatcher::new`].
    pub fn with_capacity<F: EventFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::root_not_found(path));
        }
        let root = path
            .canonicalize_utf8()
            .map_err(|source| WatchError::Canonicalize {
                path: path.to_owned(),
                source,
            })?;

        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_root = root.clone();
        let debounce = Duration::from_millis(config.debounce_ms);
        let mode = if config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher(&task_root, debounce, mode, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            root,
        })
    }

    /// Receives the next event. `None` once the watcher has stopped.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Waits for one event, then drains whatever else is already queued.
    ///
    /// `None` once the watcher has stopped.
    pub async fn recv_batch(&mut self) -> Option<FileEventBatch> {
        let first = self.event_rx.recv().await?;
        let mut batch = FileEventBatch::new();
        batch.push(first);
        while let Ok(event) = self.event_rx.try_recv() {
            batch.push(event);
        }
        trace!(events = batch.len(), "Drained event batch");
        Some(batch)
    }

    /// Receives an event if one is queued.
    pub fn try_recv(&mut self) -> Result<FileEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// The canonical watch root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns `true` while the watcher thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for its thread.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the watcher thread, or
    /// [`WatchError::Thread`] if it did not finish cleanly.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The thread may already have exited.
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            handle.await??;
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the debouncer until shutdown. Called on the blocking pool.
fn run_watcher<F: EventFilter>(
    root: &Utf8Path,
    debounce: Duration,
    mode: RecursiveMode,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let mut debouncer: Debouncer<notify::RecommendedWatcher> =
        new_debouncer(debounce, move |result: DebounceEventResult| match result {
            Ok(events) => {
                for event in events {
                    let path = match Utf8PathBuf::try_from(event.path) {
                        Ok(path) => path,
                        Err(e) => {
                            let err = WatchError::NonUtf8Path(e.into_path_buf());
                            warn!(error = %err, "Skipping file event");
                            continue;
                        }
                    };
                    if !filter.should_process(&path) {
                        trace!(path = %path, "Filtered out file event");
                        continue;
                    }
                    if event_tx.blocking_send(FileEvent::new(path)).is_err() {
                        debug!("Event channel closed");
                        break;
                    }
                }
            }
            Err(error) => warn!(error = %error, "Debouncer error"),
        })?;

    debouncer.watcher().watch(root.as_std_path(), mode)?;
    info!(root = %root, recursive = matches!(mode, RecursiveMode::Recursive), "File watcher started");

    let _ = shutdown_rx.blocking_recv();

    info!(root = %root, "File watcher stopped");
    Ok(())
}
