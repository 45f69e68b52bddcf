use std::path::PathBuf;
use std::time::Duration;

use darkroom_ingest::{DEFAULT_SETTLE, QualityPolicy};

/// Settings for [`SessionController`](crate::SessionController).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Shared folder the photographer's camera writes into.
    pub watch_folder: PathBuf,
    /// Root under which one folder per phone number is created.
    pub clients_root: PathBuf,
    /// A session ends once no photo has been accepted for this long.
    pub idle_timeout: Duration,
    /// How often the idle timer looks at the session.
    pub idle_check_interval: Duration,
    /// Pause before inspecting a newly appeared file.
    pub settle: Duration,
    /// Which photos are kept.
    pub quality: QualityPolicy,
}

impl SessionConfig {
    pub fn new(watch_folder: impl Into<PathBuf>, clients_root: impl Into<PathBuf>) -> Self {
        Self {
            watch_folder: watch_folder.into(),
            clients_root: clients_root.into(),
            idle_timeout: Duration::from_secs(600),
            idle_check_interval: Duration::from_secs(10),
            settle: DEFAULT_SETTLE,
            quality: QualityPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_idle_check_interval(mut self, interval: Duration) -> Self {
        self.idle_check_interval = interval;
        self
    }

    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    #[must_use]
    pub fn with_quality(mut self, quality: QualityPolicy) -> Self {
        self.quality = quality;
        self
    }
}
