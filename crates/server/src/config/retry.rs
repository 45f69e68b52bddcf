use std::time::Duration;

use darkroom_executor::{ExecutorConfig, RetryStrategy};
use serde::Deserialize;

/// `[retry]` section: exponential backoff for network calls.
#[derive(Debug, Deserialize)]
pub struct RetrySection {
    /// Total attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause after the first failure, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound on a single pause, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetrySection {
    pub fn to_executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            max_attempts: self.max_attempts,
            retry_strategy: RetryStrategy::Exponential {
                base: Duration::from_millis(self.base_delay_ms),
                max: Duration::from_millis(self.max_delay_ms),
                multiplier: self.multiplier,
                jitter: false,
            },
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    2000
}

fn default_max_delay() -> u64 {
    60_000
}

fn default_multiplier() -> f64 {
    2.0
}
