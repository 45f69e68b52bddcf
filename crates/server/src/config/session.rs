use std::time::Duration;

use serde::Deserialize;

/// `[session]` section.
#[derive(Debug, Deserialize)]
pub struct SessionSection {
    /// End the session after this many seconds without an accepted photo.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// How often the idle timer runs, in seconds.
    #[serde(default = "default_idle_check")]
    pub idle_check_seconds: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            idle_check_seconds: default_idle_check(),
        }
    }
}

impl SessionSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_secs(self.idle_check_seconds)
    }
}

fn default_timeout() -> u64 {
    600
}

fn default_idle_check() -> u64 {
    10
}
