//! Watch session: folder monitoring and event dispatch.
//!
//! A [`WatchSession`] owns an optional watcher handle and moves between two
//! states, Idle and Watching, via `start`/`stop`. While watching, a
//! non-recursive `notify` watcher reports creation and rename events for
//! exactly one directory; a worker thread drains those events and hands each
//! file to the [`DownloadSorter`]. Event handling runs entirely on the worker
//! thread and never assumes a particular calling context.

use crate::config::{ConfigError, SorterConfig};
use crate::output::OutputFormatter;
use crate::sorter::{DownloadSorter, SortError, SortOutcome};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;

/// How often the worker thread wakes up to check the stop signal.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can occur while starting a watch session.
#[derive(Debug)]
pub enum WatchError {
    /// Configuration could not be compiled.
    Config(ConfigError),
    /// The watched folder is invalid or destination folders could not be
    /// created.
    Sorter(SortError),
    /// The filesystem watcher could not be created or registered.
    Notify(notify::Error),
}

impl std::fmt::Display for WatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}", e),
            Self::Sorter(e) => write!(f, "{}", e),
            Self::Notify(e) => write!(f, "Failed to watch folder: {}", e),
        }
    }
}

impl std::error::Error for WatchError {}

impl From<ConfigError> for WatchError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SortError> for WatchError {
    fn from(e: SortError) -> Self {
        Self::Sorter(e)
    }
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        Self::Notify(e)
    }
}

/// Live resources of a running session: the registered watcher, the worker
/// thread draining its events, and the shared stop signal.
struct WatchHandle {
    watcher: RecommendedWatcher,
    worker: thread::JoinHandle<()>,
    stop: Arc<AtomicBool>,
}

/// A start/stoppable watch over a single folder.
///
/// # Examples
///
/// ```no_run
/// use downsort::config::SorterConfig;
/// use downsort::watcher::WatchSession;
/// use std::path::Path;
///
/// let mut session = WatchSession::new(Path::new("/home/user/Downloads"), SorterConfig::default());
/// session.start().expect("start watching");
/// // ... later
/// session.stop();
/// ```
pub struct WatchSession {
    folder: PathBuf,
    config: SorterConfig,
    handle: Option<WatchHandle>,
}

impl WatchSession {
    /// Creates an idle session for `folder`. Nothing is validated until
    /// `start`.
    pub fn new(folder: &Path, config: SorterConfig) -> Self {
        Self {
            folder: folder.to_path_buf(),
            config,
            handle: None,
        }
    }

    /// The folder this session watches.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Whether the session is currently watching.
    pub fn is_watching(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts watching. No-op if already watching.
    ///
    /// Validates the watched folder, creates the six destination folders,
    /// registers a non-recursive watcher, and spawns the worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder is invalid, destination folders cannot
    /// be created, or the watcher cannot be registered. On error the session
    /// stays Idle.
    pub fn start(&mut self) -> Result<(), WatchError> {
        if self.handle.is_some() {
            return Ok(());
        }

        let ignores = self.config.compile_ignores()?;
        let sorter = DownloadSorter::new(&self.folder, self.config.settle_delay(), ignores)?;
        // All six destination folders must exist before any event is
        // processed.
        sorter.ensure_destination_folders()?;

        let (tx, rx) = channel();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| {
                tx.send(result).ok();
            })?;
        watcher.watch(&self.folder, RecursiveMode::NonRecursive)?;

        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker = thread::spawn(move || {
            loop {
                if worker_stop.load(Ordering::SeqCst) {
                    break;
                }
                match rx.recv_timeout(STOP_POLL_INTERVAL) {
                    Ok(Ok(event)) => dispatch_event(&sorter, &event),
                    Ok(Err(e)) => {
                        OutputFormatter::warning(&format!("Watcher error: {}", e));
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.handle = Some(WatchHandle {
            watcher,
            worker,
            stop,
        });
        Ok(())
    }

    /// Stops watching and tears the handle down fully. No-op when idle.
    ///
    /// Dropping the watcher stops event delivery and disconnects the channel;
    /// the worker thread is signalled and joined before this returns, so a
    /// subsequent `start` begins from a clean slate.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop.store(true, Ordering::SeqCst);
            drop(handle.watcher);
            handle.worker.join().ok();
        }
    }

    /// Blocks until the watcher stops delivering events.
    ///
    /// Used by the CLI to keep the process alive. The watcher stays
    /// registered while this blocks, so under normal use it returns only if
    /// event delivery breaks down (watcher channel disconnects); the usual
    /// way out is terminating the process. Takes the handle, leaving the
    /// session Idle once it does return.
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.worker.join().ok();
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Applies the dispatch policy to a raw watcher event.
///
/// Create events sort every reported non-directory path. Rename events sort
/// the destination path when it lies within the watched folder; rename-away
/// halves and every other event kind are ignored. Directory events are always
/// ignored. There is no de-duplication: a file seen by both a create and a
/// rename is handled twice, and the second pass no-ops on the existence
/// guard.
fn dispatch_event(sorter: &DownloadSorter, event: &Event) {
    match event.kind {
        EventKind::Create(_) => {
            for path in &event.paths {
                process_path(sorter, path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths are [from, to]; only the destination matters.
            if let Some(dest) = event.paths.last() {
                process_moved(sorter, dest);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            // Some platforms report a move-in as a bare destination.
            for path in &event.paths {
                process_moved(sorter, path);
            }
        }
        _ => {}
    }
}

fn process_moved(sorter: &DownloadSorter, dest: &Path) {
    // A rename whose destination left the watched folder is not ours.
    if !dest.starts_with(sorter.folder()) {
        return;
    }
    process_path(sorter, dest);
}

fn process_path(sorter: &DownloadSorter, path: &Path) {
    if path.is_dir() {
        return;
    }

    match sorter.sort_file(path) {
        Ok(SortOutcome::Moved { category, .. }) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            OutputFormatter::event(&format!(
                "'{}' moved to {} folder",
                name,
                category.folder_name()
            ));
        }
        // Vanished, unrecognized, and ignored files are deliberate no-ops.
        Ok(_) => {}
        // Move failures are non-fatal by design: surface and carry on.
        Err(e) => OutputFormatter::warning(&e.to_string()),
    }
}
