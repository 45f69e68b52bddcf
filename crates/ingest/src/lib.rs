//! Watch-folder ingestion: notices new photos, keeps the good ones and
//! moves them into the client's folder.

pub mod error;
pub mod pipeline;
pub mod quality;
pub mod relocate;
pub mod transform;
pub mod watcher;

pub use error::IngestError;
pub use pipeline::{DEFAULT_SETTLE, IngestOutcome, IngestPipeline, RejectReason};
pub use quality::{ImageQualityFilter, QualityPolicy, QualityVerdict};
pub use relocate::{AtomicRelocator, FileMover, StdFileMover};
pub use transform::grayscale;
pub use watcher::{FileEvent, FileSink, FolderWatcher, WatcherState};
