//! Accept/reject decision for freshly captured images.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// Which signal decides whether a photo is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityPolicy {
    /// Keep images whose mean 8-bit luminance is strictly above `threshold`.
    Brightness { threshold: f64 },
    /// Keep images whose EXIF data says the flash fired.
    FlashFired,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self::Brightness { threshold: 0.0 }
    }
}

/// Result of a quality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityVerdict {
    Accepted,
    Rejected,
    /// The deciding signal is missing. Callers may re-check later.
    Unknown,
}

/// Applies one [`QualityPolicy`] to image files. Never modifies the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageQualityFilter {
    policy: QualityPolicy,
}

impl ImageQualityFilter {
    pub fn new(policy: QualityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> QualityPolicy {
        self.policy
    }

    /// Inspect the file at `path`.
    ///
    /// This does blocking I/O and decoding; run it on a blocking thread.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ImageUnreadable`] if the brightness policy
    /// cannot decode the file.
    pub fn accept(&self, path: &Path) -> Result<QualityVerdict, IngestError> {
        match self.policy {
            QualityPolicy::Brightness { threshold } => {
                let brightness = mean_brightness(path)?;
                tracing::debug!(path = %path.display(), brightness, threshold, "brightness measured");
                Ok(if brightness > threshold {
                    QualityVerdict::Accepted
                } else {
                    QualityVerdict::Rejected
                })
            }
            QualityPolicy::FlashFired => Ok(flash_verdict(path)),
        }
    }
}

/// Mean luminance (0-255) of the image at `path`.
fn mean_brightness(path: &Path) -> Result<f64, IngestError> {
    let unreadable = |reason: String| IngestError::ImageUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| unreadable(e.to_string()))?;
    let luma = image.to_luma8();

    let pixels = luma.as_raw();
    if pixels.is_empty() {
        return Ok(0.0);
    }
    let sum: u64 = pixels.iter().map(|&p| u64::from(p)).sum();
    #[allow(clippy::cast_precision_loss)]
    Ok(sum as f64 / pixels.len() as f64)
}

fn flash_verdict(path: &Path) -> QualityVerdict {
    let Ok(file) = File::open(path) else {
        return QualityVerdict::Unknown;
    };
    let Ok(exif) = exif::Reader::new().read_from_container(&mut BufReader::new(file)) else {
        return QualityVerdict::Unknown;
    };
    match exif
        .get_field(exif::Tag::Flash, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
    {
        // Bit 0 of the Flash tag is "flash fired".
        Some(flags) if flags & 1 == 1 => QualityVerdict::Accepted,
        Some(_) => QualityVerdict::Rejected,
        None => QualityVerdict::Unknown,
    }
}
