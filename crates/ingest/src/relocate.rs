//! Moving accepted files out of the watch folder.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use darkroom_executor::{ExecutorConfig, ExecutorError, RetryExecutor, RetryStrategy, Retryable};
use tracing::{debug, error, info};

use crate::error::IngestError;

/// Filesystem primitives used by [`AtomicRelocator`].
pub trait FileMover: Send + Sync + 'static {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// [`FileMover`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileMover;

impl FileMover for StdFileMover {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// An I/O failure while moving, classified for the retry executor.
#[derive(Debug)]
struct MoveError(io::Error);

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Retryable for MoveError {
    fn is_retryable(&self) -> bool {
        matches!(
            self.0.kind(),
            io::ErrorKind::PermissionDenied | io::ErrorKind::ResourceBusy
        )
    }
}

/// Moves a file into a destination folder without ever exposing a partial
/// file there or replacing a file already waiting in it.
///
/// Same-filesystem moves are a single `rename`. Across filesystems the file
/// is copied into a hidden `.staging` folder next to the destination, renamed
/// into place, and only then removed from the source. A name that is already
/// taken gets a numeric suffix (`IMG_0001_1.jpg`).
///
/// The destination folder must have a single writer; the free-name check and
/// the rename are not one atomic step.
pub struct AtomicRelocator {
    mover: Arc<dyn FileMover>,
    executor: RetryExecutor,
}

impl Default for AtomicRelocator {
    fn default() -> Self {
        Self::new(Arc::new(StdFileMover))
    }
}

impl AtomicRelocator {
    /// Default budget: 5 attempts, 1 second apart.
    pub fn new(mover: Arc<dyn FileMover>) -> Self {
        Self::with_retry(
            mover,
            ExecutorConfig {
                max_attempts: 5,
                retry_strategy: RetryStrategy::Constant {
                    delay: Duration::from_secs(1),
                },
            },
        )
    }

    pub fn with_retry(mover: Arc<dyn FileMover>, config: ExecutorConfig) -> Self {
        Self {
            mover,
            executor: RetryExecutor::new(config),
        }
    }

    /// Move `src` into `dest_folder`, keeping its file name unless that name
    /// is taken. Returns the new path.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::RelocationFailed`] if every attempt fails or a
    /// non-transient error occurs. The source is left in place.
    pub async fn relocate(&self, src: &Path, dest_folder: &Path) -> Result<PathBuf, IngestError> {
        let file_name = src.file_name().ok_or_else(|| {
            IngestError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", src.display()),
            ))
        })?;
        let wanted = dest_folder.join(file_name);

        let result = self
            .executor
            .run("relocate", || {
                let mover = Arc::clone(&self.mover);
                let src = src.to_path_buf();
                let dest_folder = dest_folder.to_path_buf();
                async move {
                    tokio::task::spawn_blocking(move || move_once(mover.as_ref(), &src, &dest_folder))
                        .await
                        .map_err(|e| MoveError(io::Error::other(e)))?
                        .map_err(MoveError)
                }
            })
            .await;

        match result {
            Ok(dest) => {
                if dest != wanted {
                    info!(wanted = %wanted.display(), "name taken, using a free one");
                }
                info!(from = %src.display(), to = %dest.display(), "file relocated");
                Ok(dest)
            }
            Err(err) => {
                let attempts = match &err {
                    ExecutorError::RetriesExhausted { attempts, .. } => *attempts,
                    ExecutorError::Permanent(_) => 1,
                };
                let MoveError(source) = err.into_inner();
                error!(
                    path = %src.display(),
                    dest = %wanted.display(),
                    attempts,
                    error = %source,
                    "relocation failed, leaving file in place"
                );
                Err(IngestError::RelocationFailed {
                    path: src.to_path_buf(),
                    attempts,
                    source,
                })
            }
        }
    }
}

/// Name of the folder, next to a destination, that holds cross-device copies
/// until they are complete.
pub const STAGING_DIR: &str = ".staging";

fn move_once(mover: &dyn FileMover, src: &Path, dest_folder: &Path) -> io::Result<PathBuf> {
    let dest = free_destination(src, dest_folder)?;
    match mover.rename(src, &dest) {
        Ok(()) => Ok(dest),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %src.display(), "cross-device move, copying");
            copy_then_swap(mover, src, &dest)?;
            Ok(dest)
        }
        Err(e) => Err(e),
    }
}

/// First path in `dest_folder` named after `src` that does not exist yet:
/// `name.ext`, then `name_1.ext`, `name_2.ext` and so on.
fn free_destination(src: &Path, dest_folder: &Path) -> io::Result<PathBuf> {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = src.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n = 0u32;
    loop {
        let name = match (n, &ext) {
            (0, _) => src.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default(),
            (n, Some(ext)) => format!("{stem}_{n}.{ext}"),
            (n, None) => format!("{stem}_{n}"),
        };
        let candidate = dest_folder.join(name);
        if !candidate.try_exists()? {
            return Ok(candidate);
        }
        n += 1;
    }
}

fn copy_then_swap(mover: &dyn FileMover, src: &Path, dest: &Path) -> io::Result<()> {
    let folder = dest.parent().unwrap_or(dest);
    let staging_dir = folder.parent().unwrap_or(folder).join(STAGING_DIR);
    std::fs::create_dir_all(&staging_dir)?;

    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = staging_dir.join(format!("{name}.partial"));

    if let Err(e) = mover.copy(src, &staging).and_then(|_| mover.rename(&staging, dest)) {
        let _ = mover.remove(&staging);
        return Err(e);
    }
    mover.remove(src)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Fails the first `denials` renames of the source with `PermissionDenied`.
    struct DenyingMover {
        denials: u32,
        renames: AtomicU32,
    }

    impl DenyingMover {
        fn new(denials: u32) -> Self {
            Self {
                denials,
                renames: AtomicU32::new(0),
            }
        }
    }

    impl FileMover for DenyingMover {
        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            let n = self.renames.fetch_add(1, Ordering::SeqCst);
            if n < self.denials {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            std::fs::rename(from, to)
        }

        fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
            std::fs::copy(from, to)
        }

        fn remove(&self, path: &Path) -> io::Result<()> {
            std::fs::remove_file(path)
        }
    }

    /// Reports every rename out of `foreign` as crossing devices.
    struct CrossDeviceMover {
        foreign: PathBuf,
    }

    impl FileMover for CrossDeviceMover {
        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            if from.starts_with(&self.foreign) {
                return Err(io::Error::from(io::ErrorKind::CrossesDevices));
            }
            std::fs::rename(from, to)
        }

        fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
            std::fs::copy(from, to)
        }

        fn remove(&self, path: &Path) -> io::Result<()> {
            std::fs::remove_file(path)
        }
    }

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let watch = root.path().join("watch");
        let dest = root.path().join("dest");
        std::fs::create_dir_all(&watch).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        (root, watch, dest)
    }

    #[tokio::test]
    async fn same_device_move() {
        let (_root, watch, dest) = setup();
        let src = watch.join("IMG_1.jpg");
        std::fs::write(&src, b"data").unwrap();

        let moved = AtomicRelocator::default()
            .relocate(&src, &dest)
            .await
            .unwrap();

        assert_eq!(moved, dest.join("IMG_1.jpg"));
        assert!(!src.exists());
        assert_eq!(std::fs::read(&moved).unwrap(), b"data");
    }

    #[tokio::test(start_paused = true)]
    async fn transient_denials_are_retried() {
        let (_root, watch, dest) = setup();
        let src = watch.join("IMG_2.jpg");
        std::fs::write(&src, b"data").unwrap();

        let relocator = AtomicRelocator::new(Arc::new(DenyingMover::new(3)));
        let moved = relocator.relocate(&src, &dest).await.unwrap();
        assert!(moved.exists());
        assert!(!src.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_denial_leaves_source_in_place() {
        let (_root, watch, dest) = setup();
        let src = watch.join("IMG_3.jpg");
        std::fs::write(&src, b"data").unwrap();

        let relocator = AtomicRelocator::new(Arc::new(DenyingMover::new(u32::MAX)));
        let err = relocator.relocate(&src, &dest).await.unwrap_err();

        match err {
            IngestError::RelocationFailed { attempts, .. } => assert_eq!(attempts, 5),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(src.exists());
        assert!(!dest.join("IMG_3.jpg").exists());
    }

    #[tokio::test]
    async fn missing_source_fails_without_retry() {
        let (_root, watch, dest) = setup();
        let err = AtomicRelocator::default()
            .relocate(&watch.join("gone.jpg"), &dest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::RelocationFailed { attempts: 1, .. }
        ));
    }

    #[tokio::test]
    async fn cross_device_copies_then_swaps() {
        let (_root, watch, dest) = setup();
        let src = watch.join("IMG_4.jpg");
        std::fs::write(&src, b"across").unwrap();

        let relocator = AtomicRelocator::new(Arc::new(CrossDeviceMover {
            foreign: watch.clone(),
        }));
        let moved = relocator.relocate(&src, &dest).await.unwrap();

        assert_eq!(std::fs::read(&moved).unwrap(), b"across");
        assert!(!src.exists());
        let leftovers: Vec<_> = std::fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "no staging file left: {leftovers:?}");
        let staged = root_staging(&dest);
        assert!(std::fs::read_dir(staged).unwrap().next().is_none());
    }

    fn root_staging(dest: &Path) -> PathBuf {
        dest.parent().unwrap().join(STAGING_DIR)
    }

    #[tokio::test]
    async fn cross_device_copy_is_never_visible_in_destination() {
        let (_root, watch, dest) = setup();
        let src = watch.join("IMG_5.jpg");
        std::fs::write(&src, b"big photo").unwrap();

        /// Checks the destination holds no partial file while copying.
        struct WatchfulMover {
            foreign: PathBuf,
            dest: PathBuf,
        }

        impl FileMover for WatchfulMover {
            fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
                if from.starts_with(&self.foreign) {
                    return Err(io::Error::from(io::ErrorKind::CrossesDevices));
                }
                std::fs::rename(from, to)
            }

            fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
                let copied = std::fs::copy(from, to)?;
                assert!(!to.starts_with(&self.dest), "staged inside destination");
                assert!(std::fs::read_dir(&self.dest).unwrap().next().is_none());
                Ok(copied)
            }

            fn remove(&self, path: &Path) -> io::Result<()> {
                std::fs::remove_file(path)
            }
        }

        let relocator = AtomicRelocator::new(Arc::new(WatchfulMover {
            foreign: watch.clone(),
            dest: dest.clone(),
        }));
        let moved = relocator.relocate(&src, &dest).await.unwrap();
        assert_eq!(moved, dest.join("IMG_5.jpg"));
        assert_eq!(std::fs::read(&moved).unwrap(), b"big photo");
    }

    #[tokio::test]
    async fn reused_name_does_not_replace_waiting_photo() {
        let (_root, watch, dest) = setup();
        let relocator = AtomicRelocator::default();

        let src = watch.join("IMG_0001.jpg");
        std::fs::write(&src, b"first shot").unwrap();
        let first = relocator.relocate(&src, &dest).await.unwrap();

        std::fs::write(&src, b"second shot").unwrap();
        let second = relocator.relocate(&src, &dest).await.unwrap();

        std::fs::write(&src, b"third shot").unwrap();
        let third = relocator.relocate(&src, &dest).await.unwrap();

        assert_eq!(first, dest.join("IMG_0001.jpg"));
        assert_eq!(second, dest.join("IMG_0001_1.jpg"));
        assert_eq!(third, dest.join("IMG_0001_2.jpg"));
        assert_eq!(std::fs::read(&first).unwrap(), b"first shot");
        assert_eq!(std::fs::read(&second).unwrap(), b"second shot");
        assert_eq!(std::fs::read(&third).unwrap(), b"third shot");
    }

    #[tokio::test]
    async fn reused_name_across_devices_keeps_both() {
        let (_root, watch, dest) = setup();
        std::fs::write(dest.join("IMG_7.jpg"), b"waiting").unwrap();
        let src = watch.join("IMG_7.jpg");
        std::fs::write(&src, b"new").unwrap();

        let relocator = AtomicRelocator::new(Arc::new(CrossDeviceMover {
            foreign: watch.clone(),
        }));
        let moved = relocator.relocate(&src, &dest).await.unwrap();

        assert_eq!(moved, dest.join("IMG_7_1.jpg"));
        assert_eq!(std::fs::read(dest.join("IMG_7.jpg")).unwrap(), b"waiting");
        assert_eq!(std::fs::read(&moved).unwrap(), b"new");
    }

    #[test]
    fn free_destination_handles_missing_extension() {
        let (_root, watch, dest) = setup();
        std::fs::write(dest.join("RAW"), b"x").unwrap();
        let next = free_destination(&watch.join("RAW"), &dest).unwrap();
        assert_eq!(next, dest.join("RAW_1"));
    }
}
