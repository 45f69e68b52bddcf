use std::path::PathBuf;

use thiserror::Error;

use crate::watcher::WatcherState;

/// Errors produced while ingesting files from the watch folder.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The file could not be decoded as an image.
    #[error("unreadable image {path}: {reason}")]
    ImageUnreadable { path: PathBuf, reason: String },

    /// Moving the file into the destination folder kept failing.
    #[error("failed to relocate {path} after {attempts} attempts: {source}")]
    RelocationFailed {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the transformed image failed.
    #[error("image encoding failed: {0}")]
    Encode(String),

    /// The OS file-watch subscription could not be created.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// The watcher was asked to start from a state other than idle.
    #[error("watcher cannot start from state {0:?}")]
    NotIdle(WatcherState),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
