use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::IngestError;

/// Capacity of the queue between the OS callback thread and the sink task.
const EVENT_QUEUE: usize = 256;

/// Something that happened in the watched folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    /// A file was created in, or renamed into, the folder.
    Appeared(PathBuf),
}

/// Receives events from a [`FolderWatcher`], one at a time and in order.
#[async_trait]
pub trait FileSink: Send + Sync + 'static {
    async fn on_event(&self, event: FileEvent);
}

/// Lifecycle of a [`FolderWatcher`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Watching,
    Stopped,
}

/// Non-recursive watch on one folder, forwarding file arrivals to a
/// [`FileSink`].
///
/// Files already present when watching starts are not reported. Dropping
/// the watcher stops it.
pub struct FolderWatcher {
    folder: PathBuf,
    state: Mutex<WatcherState>,
    cancel: CancellationToken,
}

impl FolderWatcher {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            state: Mutex::new(WatcherState::Idle),
            cancel: CancellationToken::new(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn state(&self) -> WatcherState {
        *self.state.lock()
    }

    /// Subscribe to the folder and spawn the task feeding `sink`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::NotIdle`] if the watcher was already started,
    /// or [`IngestError::Watch`] if the OS subscription fails. A failed start
    /// leaves the watcher idle.
    pub fn start(&self, sink: Arc<dyn FileSink>) -> Result<(), IngestError> {
        let mut state = self.state.lock();
        if *state != WatcherState::Idle {
            return Err(IngestError::NotIdle(*state));
        }

        let (tx, rx) = mpsc::channel::<PathBuf>(EVENT_QUEUE);
        let folder = self.folder.clone();
        let canonical = self.folder.canonicalize().unwrap_or_else(|_| folder.clone());

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if let Some(path) = appeared_path(&event, &folder, &canonical) {
                        // Runs on the notify thread, outside the runtime.
                        let _ = tx.blocking_send(path);
                    }
                }
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.folder, RecursiveMode::NonRecursive)?;
        info!(folder = %self.folder.display(), "folder watcher started");

        tokio::spawn(forward_events(watcher, rx, sink, self.cancel.clone()));
        *state = WatcherState::Watching;
        Ok(())
    }

    /// Stop watching. Idempotent.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != WatcherState::Stopped {
            self.cancel.cancel();
            *state = WatcherState::Stopped;
            info!(folder = %self.folder.display(), "folder watcher stopped");
        }
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns the OS watcher for as long as events are forwarded, so every exit
/// path releases the subscription.
async fn forward_events(
    watcher: RecommendedWatcher,
    mut rx: mpsc::Receiver<PathBuf>,
    sink: Arc<dyn FileSink>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(path) => {
                    debug!(path = %path.display(), "file appeared");
                    sink.on_event(FileEvent::Appeared(path)).await;
                }
                None => break,
            },
        }
    }
    // Close the queue first so a blocked notify thread is released.
    drop(rx);
    drop(watcher);
    debug!("folder watcher task finished");
}

/// Path of a file that arrived in `folder`, if `event` describes one.
///
/// A rename is reported through its `To` half only. The paired `Both` event
/// that inotify sends for the same rename is ignored so the file is queued
/// once.
fn appeared_path(event: &notify::Event, folder: &Path, canonical: &Path) -> Option<PathBuf> {
    let path = match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event.paths.first(),
        _ => None,
    }?;
    let parent = path.parent()?;
    (parent == folder || parent == canonical).then(|| path.clone())
}
