use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image file extensions accepted from the watch folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
}

impl ImageExtension {
    /// Classify a path by its extension, case-insensitively.
    ///
    /// Returns `None` for anything that is not `.jpg`, `.jpeg` or `.png`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("jpg") {
            Some(Self::Jpg)
        } else if ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// A file observed in the watch folder together with the ingest verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub extension: ImageExtension,
    pub accepted_at: Option<DateTime<Utc>>,
    pub quality_verdict: bool,
}

impl ImageAsset {
    /// Describe a freshly observed file. Returns `None` for non-image files.
    #[must_use]
    pub fn observed(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let extension = ImageExtension::from_path(&path)?;
        Some(Self {
            path,
            extension,
            accepted_at: None,
            quality_verdict: false,
        })
    }

    /// Mark the asset as accepted at `at`, now living at `path`.
    #[must_use]
    pub fn accept(mut self, path: PathBuf, at: DateTime<Utc>) -> Self {
        self.path = path;
        self.accepted_at = Some(at);
        self.quality_verdict = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(
            ImageExtension::from_path(Path::new("a/IMG_0001.JPG")),
            Some(ImageExtension::Jpg)
        );
        assert_eq!(
            ImageExtension::from_path(Path::new("b.Jpeg")),
            Some(ImageExtension::Jpeg)
        );
        assert_eq!(
            ImageExtension::from_path(Path::new("c.png")),
            Some(ImageExtension::Png)
        );
    }

    #[test]
    fn other_extensions_are_ignored() {
        for p in ["junk.txt", "raw.cr2", "noext", ".jpg.tmp", "photo.jpg~"] {
            assert_eq!(ImageExtension::from_path(Path::new(p)), None, "{p}");
        }
    }

    #[test]
    fn observed_then_accepted() {
        let asset = ImageAsset::observed("/w/photo1.jpg").unwrap();
        assert!(!asset.quality_verdict);
        let now = Utc::now();
        let asset = asset.accept(PathBuf::from("/c/+7/photo1.jpg"), now);
        assert!(asset.quality_verdict);
        assert_eq!(asset.accepted_at, Some(now));
        assert_eq!(asset.path, PathBuf::from("/c/+7/photo1.jpg"));
        assert!(ImageAsset::observed("/w/junk.txt").is_none());
    }
}
