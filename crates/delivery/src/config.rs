use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What to do with a file whose delivery failed with a non-transient error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedItemPolicy {
    /// Delete the file and move on.
    #[default]
    Discard,
    /// Leave the file in the folder and skip it for the rest of the run.
    Retain,
}

/// Polling parameters for [`DeliveryPipeline`](crate::DeliveryPipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Pause between looks at an empty folder.
    pub check_interval: Duration,
    /// Stop once the folder has stayed empty this long.
    pub max_wait: Duration,
    pub failed_item_policy: FailedItemPolicy,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(600),
            failed_item_policy: FailedItemPolicy::Discard,
        }
    }
}
