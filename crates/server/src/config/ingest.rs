use std::time::Duration;

use darkroom_ingest::QualityPolicy;
use serde::Deserialize;

/// Which quality check decides whether a photo is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPolicyKind {
    #[default]
    Brightness,
    FlashFired,
}

/// `[ingest]` section.
#[derive(Debug, Deserialize)]
pub struct IngestSection {
    /// Pause before inspecting a new file, in milliseconds.
    #[serde(default = "default_settle")]
    pub settle_millis: u64,
    #[serde(default)]
    pub quality_policy: QualityPolicyKind,
    /// Mean brightness (0-255) a photo must exceed under the brightness
    /// policy.
    #[serde(default)]
    pub brightness_threshold: f64,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            settle_millis: default_settle(),
            quality_policy: QualityPolicyKind::default(),
            brightness_threshold: 0.0,
        }
    }
}

impl IngestSection {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn policy(&self) -> QualityPolicy {
        match self.quality_policy {
            QualityPolicyKind::Brightness => QualityPolicy::Brightness {
                threshold: self.brightness_threshold,
            },
            QualityPolicyKind::FlashFired => QualityPolicy::FlashFired,
        }
    }
}

fn default_settle() -> u64 {
    1000
}
