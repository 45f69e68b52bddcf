//! Per-file ingest logic: filter, settle, judge, then delete or relocate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use darkroom_core::ImageAsset;

use crate::error::IngestError;
use crate::quality::{ImageQualityFilter, QualityVerdict};
use crate::relocate::AtomicRelocator;
use crate::watcher::{FileEvent, FileSink};

/// Default pause between a file appearing and inspecting it, letting the
/// writer finish.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

/// Why a file was deleted instead of kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The quality policy said no.
    Quality,
    /// The quality policy could not decide, even after a second look.
    Undetermined,
    /// The file could not be decoded.
    Unreadable,
}

/// What happened to one observed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not an image, or gone before it could be inspected. Left untouched.
    Ignored,
    /// Deleted from the watch folder.
    Rejected(RejectReason),
    /// Moved into the destination folder.
    Accepted(ImageAsset),
}

/// Judges files that appear in the watch folder and moves keepers into one
/// destination folder.
pub struct IngestPipeline {
    destination: PathBuf,
    filter: ImageQualityFilter,
    relocator: AtomicRelocator,
    settle: Duration,
}

impl IngestPipeline {
    pub fn new(destination: impl Into<PathBuf>, filter: ImageQualityFilter) -> Self {
        Self {
            destination: destination.into(),
            filter,
            relocator: AtomicRelocator::default(),
            settle: DEFAULT_SETTLE,
        }
    }

    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    #[must_use]
    pub fn with_relocator(mut self, relocator: AtomicRelocator) -> Self {
        self.relocator = relocator;
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Handle one file that appeared in the watch folder.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::RelocationFailed`] when an accepted file could
    /// not be moved (it stays in the watch folder), or an I/O error if a
    /// rejected file could not be deleted.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn process(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        let Some(asset) = ImageAsset::observed(path) else {
            debug!("not an image, ignoring");
            return Ok(IngestOutcome::Ignored);
        };

        tokio::time::sleep(self.settle).await;
        let mut verdict = self.judge(path).await;

        if matches!(verdict, Ok(QualityVerdict::Unknown)) {
            debug!("quality undetermined, checking again");
            tokio::time::sleep(self.settle).await;
            verdict = self.judge(path).await;
        }

        let reason = match verdict {
            Ok(QualityVerdict::Accepted) => {
                let moved = self.relocator.relocate(path, &self.destination).await?;
                info!(dest = %moved.display(), "photo accepted");
                return Ok(IngestOutcome::Accepted(asset.accept(moved, Utc::now())));
            }
            Ok(QualityVerdict::Rejected) => RejectReason::Quality,
            Ok(QualityVerdict::Unknown) => RejectReason::Undetermined,
            Err(IngestError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("file vanished before inspection");
                return Ok(IngestOutcome::Ignored);
            }
            Err(e) => {
                warn!(error = %e, "image unreadable");
                RejectReason::Unreadable
            }
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!(?reason, "photo rejected and deleted");
        Ok(IngestOutcome::Rejected(reason))
    }

    async fn judge(&self, path: &Path) -> Result<QualityVerdict, IngestError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound).into());
        }
        let filter = self.filter;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || filter.accept(&path))
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl FileSink for IngestPipeline {
    async fn on_event(&self, event: FileEvent) {
        let FileEvent::Appeared(path) = event;
        if let Err(e) = self.process(&path).await {
            error!(path = %path.display(), error = %e, "ingest failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Luma, Rgb};

    use super::*;
    use crate::quality::QualityPolicy;

    struct Dirs {
        _root: tempfile::TempDir,
        watch: PathBuf,
        dest: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = tempfile::tempdir().unwrap();
        let watch = root.path().join("photo");
        let dest = root.path().join("clients").join("+79161234567");
        std::fs::create_dir_all(&watch).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        Dirs {
            _root: root,
            watch,
            dest,
        }
    }

    fn pipeline(dest: &Path) -> IngestPipeline {
        IngestPipeline::new(dest, ImageQualityFilter::default()).with_settle(Duration::ZERO)
    }

    fn bright(path: &Path) {
        image::RgbImage::from_pixel(16, 16, Rgb([220, 210, 200]))
            .save(path)
            .unwrap();
    }

    #[tokio::test]
    async fn bright_photo_is_moved_and_text_file_untouched() {
        let d = dirs();
        let photo = d.watch.join("photo1.jpg");
        let junk = d.watch.join("junk.txt");
        bright(&photo);
        std::fs::write(&junk, b"notes").unwrap();

        let pipeline = pipeline(&d.dest);
        let outcome = pipeline.process(&photo).await.unwrap();
        let ignored = pipeline.process(&junk).await.unwrap();

        match outcome {
            IngestOutcome::Accepted(asset) => {
                assert_eq!(asset.path, d.dest.join("photo1.jpg"));
                assert!(asset.quality_verdict);
                assert!(asset.accepted_at.is_some());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ignored, IngestOutcome::Ignored);
        assert!(d.dest.join("photo1.jpg").exists());
        assert!(!photo.exists());
        assert!(junk.exists());
        assert!(!d.dest.join("junk.txt").exists());
    }

    #[tokio::test]
    async fn uppercase_extension_is_processed() {
        let d = dirs();
        let photo = d.watch.join("IMG_0001.JPG");
        bright(&photo);

        let outcome = pipeline(&d.dest).process(&photo).await.unwrap();
        assert!(matches!(outcome, IngestOutcome::Accepted(_)));
        assert!(d.dest.join("IMG_0001.JPG").exists());
    }

    #[tokio::test]
    async fn dark_photo_is_deleted() {
        let d = dirs();
        let photo = d.watch.join("dark.png");
        image::GrayImage::from_pixel(16, 16, Luma([0]))
            .save(&photo)
            .unwrap();

        let outcome = pipeline(&d.dest).process(&photo).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Rejected(RejectReason::Quality));
        assert!(!photo.exists());
        assert_eq!(std::fs::read_dir(&d.dest).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn unreadable_image_is_deleted() {
        let d = dirs();
        let photo = d.watch.join("broken.jpeg");
        std::fs::write(&photo, b"truncated").unwrap();

        let outcome = pipeline(&d.dest).process(&photo).await.unwrap();
        assert_eq!(outcome, IngestOutcome::Rejected(RejectReason::Unreadable));
        assert!(!photo.exists());
    }

    #[tokio::test]
    async fn vanished_file_is_ignored() {
        let d = dirs();
        let outcome = pipeline(&d.dest)
            .process(&d.watch.join("ghost.jpg"))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn undetermined_flash_is_rechecked_then_rejected() {
        let d = dirs();
        let photo = d.watch.join("noexif.jpg");
        bright(&photo);

        let pipeline = IngestPipeline::new(&d.dest, ImageQualityFilter::new(QualityPolicy::FlashFired));
        let start = tokio::time::Instant::now();
        let outcome = pipeline.process(&photo).await.unwrap();

        assert_eq!(outcome, IngestOutcome::Rejected(RejectReason::Undetermined));
        assert!(start.elapsed() >= DEFAULT_SETTLE * 2, "settled twice");
        assert!(!photo.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_settle_before_judging() {
        let d = dirs();
        let photo = d.watch.join("slow.jpg");
        bright(&photo);

        let pipeline = IngestPipeline::new(&d.dest, ImageQualityFilter::default());
        let start = tokio::time::Instant::now();
        pipeline.process(&photo).await.unwrap();
        assert!(start.elapsed() >= DEFAULT_SETTLE);
    }
}
