//! The polling loop shared by every delivery strategy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use darkroom_core::{ChatId, OwnerId};
use darkroom_provider::ChatChannel;
use darkroom_state::{StateStore, get_client_folder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{DeliveryConfig, FailedItemPolicy};
use crate::error::DeliveryError;
use crate::notice;
use crate::strategy::{DeliveryContext, DeliveryStrategy};

/// How a delivery run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The folder stayed empty for the configured wait and the final
    /// notification was sent.
    Completed,
    /// A step kept failing; the run stopped early and the client was told.
    Aborted,
    /// The owner has no recorded folder; nothing was polled.
    NoRecord,
    /// Shutdown was requested while waiting for more files. What was
    /// already in the folder has been handled.
    Interrupted,
}

/// Summary of a delivery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub discarded: usize,
    pub outcome: DeliveryOutcome,
}

impl DeliveryReport {
    fn new(outcome: DeliveryOutcome) -> Self {
        Self {
            delivered: 0,
            discarded: 0,
            outcome,
        }
    }
}

/// Drains a destination folder through a [`DeliveryStrategy`] until it has
/// stayed empty for [`DeliveryConfig::max_wait`].
pub struct DeliveryPipeline {
    channel: Arc<dyn ChatChannel>,
    state: Arc<dyn StateStore>,
    config: DeliveryConfig,
    shutdown: CancellationToken,
}

impl DeliveryPipeline {
    pub fn new(
        channel: Arc<dyn ChatChannel>,
        state: Arc<dyn StateStore>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            channel,
            state,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop waiting for new files once `token` is cancelled.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Look up the folder `owner` last used and deliver from it.
    ///
    /// Without a record the client is told there are no photos and the run
    /// ends immediately with [`DeliveryOutcome::NoRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::State`] if the lookup fails.
    pub async fn run_for_owner(
        &self,
        strategy: &dyn DeliveryStrategy,
        chat: ChatId,
        owner: OwnerId,
    ) -> Result<DeliveryReport, DeliveryError> {
        let Some(record) = get_client_folder(self.state.as_ref(), owner).await? else {
            info!(owner = %owner, "no folder recorded, nothing to deliver");
            self.notify(chat, notice::NO_PHOTOS).await;
            return Ok(DeliveryReport::new(DeliveryOutcome::NoRecord));
        };
        let ctx = DeliveryContext::new(chat, record.phone, record.destination_folder);
        self.run(strategy, ctx).await
    }

    /// Deliver files from `ctx.folder` until it has stayed empty long enough.
    ///
    /// Each regular file is handed to the strategy once and removed after
    /// success. A step that exhausts its retries aborts the run and leaves
    /// the file in place. Other per-file failures follow
    /// [`DeliveryConfig::failed_item_policy`].
    ///
    /// Failures are reported to the client and logged; the returned error
    /// is only for failures that prevent reading the folder at all.
    #[instrument(skip(self, strategy, ctx), fields(strategy = strategy.name(), chat = %ctx.chat, folder = %ctx.folder.display()))]
    pub async fn run(
        &self,
        strategy: &dyn DeliveryStrategy,
        mut ctx: DeliveryContext,
    ) -> Result<DeliveryReport, DeliveryError> {
        let mut report = DeliveryReport::new(DeliveryOutcome::Completed);

        if let Err(e) = strategy.prepare(&mut ctx).await {
            error!(error = %e, "delivery preparation failed");
            self.notify(ctx.chat, notice::DELIVERY_FAILED).await;
            report.outcome = DeliveryOutcome::Aborted;
            return Ok(report);
        }

        let mut skipped: HashSet<PathBuf> = HashSet::new();
        let mut idle = std::time::Duration::ZERO;

        loop {
            let files = list_files(&ctx.folder, &skipped).await?;
            let mut processed = 0usize;

            for file in files {
                match strategy.deliver(&ctx, &file).await {
                    Ok(()) => {
                        report.delivered += 1;
                        processed += 1;
                        remove_delivered(&file, &mut skipped).await;
                    }
                    Err(e) if e.is_exhausted() => {
                        error!(file = %file.display(), error = %e, "delivery aborted");
                        self.notify(ctx.chat, notice::DELIVERY_FAILED).await;
                        report.outcome = DeliveryOutcome::Aborted;
                        return Ok(report);
                    }
                    Err(e) => match self.config.failed_item_policy {
                        FailedItemPolicy::Discard => {
                            warn!(file = %file.display(), error = %e, "delivery failed, discarding file");
                            report.discarded += 1;
                            processed += 1;
                            remove_delivered(&file, &mut skipped).await;
                        }
                        FailedItemPolicy::Retain => {
                            warn!(file = %file.display(), error = %e, "delivery failed, keeping file");
                            skipped.insert(file);
                        }
                    },
                }
            }

            if processed > 0 {
                idle = std::time::Duration::ZERO;
                continue;
            }

            tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!("shutdown requested, ending delivery early");
                    report.outcome = DeliveryOutcome::Interrupted;
                    break;
                }
                () = tokio::time::sleep(self.config.check_interval) => {}
            }
            idle += self.config.check_interval;
            debug!(idle_secs = idle.as_secs(), "folder empty");
            if idle >= self.config.max_wait {
                break;
            }
        }

        if let Err(e) = strategy.finish(&ctx).await {
            error!(error = %e, "final notification failed");
        }
        self.notify(ctx.chat, notice::SHARE_INVITATION).await;
        info!(
            delivered = report.delivered,
            discarded = report.discarded,
            "delivery completed"
        );
        Ok(report)
    }

    async fn notify(&self, chat: ChatId, text: &str) {
        if let Err(e) = self.channel.send_message(chat, text, &[]).await {
            warn!(error = %e, "failed to notify client");
        }
    }
}

/// Regular files in `folder`, in listing order, minus `skipped`. Hidden
/// entries are never delivered.
async fn list_files(
    folder: &Path,
    skipped: &HashSet<PathBuf>,
) -> Result<Vec<PathBuf>, DeliveryError> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type().await?.is_file() && !skipped.contains(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

/// Remove a handled file. If that fails it is skipped from now on so it is
/// never handled twice.
async fn remove_delivered(file: &Path, skipped: &mut HashSet<PathBuf>) {
    match tokio::fs::remove_file(file).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(file = %file.display(), error = %e, "could not remove delivered file");
            skipped.insert(file.to_path_buf());
        }
    }
}
