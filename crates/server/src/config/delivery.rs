use std::time::Duration;

use darkroom_delivery::{DeliveryConfig, FailedItemPolicy};
use serde::Deserialize;

/// `[delivery]` section.
#[derive(Debug, Deserialize)]
pub struct DeliverySection {
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Finish once the folder has been empty this long, in seconds.
    #[serde(default = "default_max_wait")]
    pub max_wait_seconds: u64,
    /// `"discard"` (default) or `"retain"`.
    #[serde(default)]
    pub failed_item_policy: FailedItemPolicy,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval(),
            max_wait_seconds: default_max_wait(),
            failed_item_policy: FailedItemPolicy::default(),
        }
    }
}

impl DeliverySection {
    pub fn to_config(&self) -> DeliveryConfig {
        DeliveryConfig {
            check_interval: Duration::from_secs(self.check_interval_seconds),
            max_wait: Duration::from_secs(self.max_wait_seconds),
            failed_item_policy: self.failed_item_policy,
        }
    }
}

fn default_check_interval() -> u64 {
    10
}

fn default_max_wait() -> u64 {
    600
}
