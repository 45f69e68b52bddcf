//! Delivery into a published cloud folder.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use darkroom_core::PhoneNumber;
use darkroom_executor::RetryExecutor;
use darkroom_provider::{ChatChannel, CloudStorage, FolderStatus, ProviderError};
use tracing::{info, instrument, warn};

use crate::error::DeliveryError;
use crate::notice;
use crate::strategy::{DeliveryContext, DeliveryStrategy};

/// Remote folder holding the photos of `phone`.
pub fn remote_folder(phone: &PhoneNumber) -> String {
    format!("disk:/{}", phone.folder_name())
}

/// Uploads each photo into a per-phone cloud folder and sends its public
/// link at the end.
pub struct CloudDelivery {
    storage: Arc<dyn CloudStorage>,
    channel: Arc<dyn ChatChannel>,
    executor: RetryExecutor,
}

impl CloudDelivery {
    pub fn new(
        storage: Arc<dyn CloudStorage>,
        channel: Arc<dyn ChatChannel>,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            storage,
            channel,
            executor,
        }
    }
}

#[async_trait]
impl DeliveryStrategy for CloudDelivery {
    fn name(&self) -> &'static str {
        "cloud"
    }

    #[instrument(skip(self, ctx), fields(phone = %ctx.phone))]
    async fn prepare(&self, ctx: &mut DeliveryContext) -> Result<(), DeliveryError> {
        let remote = remote_folder(&ctx.phone);

        let status = self
            .executor
            .run("create_folder", || self.storage.create_folder(&remote))
            .await?;
        if status == FolderStatus::AlreadyExists {
            info!(remote = %remote, "cloud folder already exists");
        }
        self.executor
            .run("publish", || self.storage.publish(&remote))
            .await?;
        ctx.public_link = self
            .executor
            .run("public_link", || self.storage.public_link(&remote))
            .await?;

        if ctx.public_link.is_none() {
            warn!(remote = %remote, "published folder has no public link");
        }
        Ok(())
    }

    #[instrument(skip(self, ctx, file), fields(phone = %ctx.phone, file = %file.display()))]
    async fn deliver(&self, ctx: &DeliveryContext, file: &Path) -> Result<(), DeliveryError> {
        let name = file
            .file_name()
            .ok_or_else(|| {
                ProviderError::Configuration(format!("{} has no file name", file.display()))
            })?
            .to_string_lossy();
        let remote = format!("{}/{name}", remote_folder(&ctx.phone));

        self.executor
            .run("upload", || self.storage.upload(file, &remote))
            .await?;
        Ok(())
    }

    async fn finish(&self, ctx: &DeliveryContext) -> Result<(), DeliveryError> {
        let text = match &ctx.public_link {
            Some(link) => notice::cloud_link(link),
            None => notice::CLOUD_DONE_NO_LINK.to_owned(),
        };
        self.channel.send_message(ctx.chat, &text, &[]).await?;
        Ok(())
    }
}
