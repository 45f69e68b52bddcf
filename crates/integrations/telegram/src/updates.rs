use std::sync::Arc;

use darkroom_provider::ProviderError;
use tracing::debug;

use crate::provider::TelegramChannel;
use crate::types::Update;

/// Long-polls `getUpdates`, tracking the acknowledgement offset.
///
/// Each call to [`next_batch`](Self::next_batch) confirms every update
/// returned by the previous call, so an update is handed out at most once
/// while the process runs.
pub struct UpdatePoller {
    channel: Arc<TelegramChannel>,
    offset: Option<i64>,
}

impl UpdatePoller {
    pub fn new(channel: Arc<TelegramChannel>) -> Self {
        Self {
            channel,
            offset: None,
        }
    }

    /// Offset sent with the next request.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Wait for the next batch of updates. May return an empty batch when the
    /// long-poll window elapses without activity.
    pub async fn next_batch(&mut self) -> Result<Vec<Update>, ProviderError> {
        let updates = self.channel.get_updates(self.offset).await?;
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset = Some(last + 1);
        }
        debug!(count = updates.len(), offset = ?self.offset, "received updates");
        Ok(updates)
    }
}
