//! Delivery as chat attachments.

use std::path::Path;
use std::slice;
use std::sync::Arc;

use async_trait::async_trait;
use darkroom_core::{CallbackCommand, DeliveredFile, InlineAction};
use darkroom_executor::RetryExecutor;
use darkroom_provider::ChatChannel;
use darkroom_state::{StateStore, put_file_token};
use tracing::{debug, instrument};

use crate::error::DeliveryError;
use crate::notice;
use crate::strategy::{DeliveryContext, DeliveryStrategy};

/// Sends each photo as a document and offers a grayscale copy of it.
pub struct ChatDelivery {
    channel: Arc<dyn ChatChannel>,
    state: Arc<dyn StateStore>,
    executor: RetryExecutor,
}

impl ChatDelivery {
    pub fn new(
        channel: Arc<dyn ChatChannel>,
        state: Arc<dyn StateStore>,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            channel,
            state,
            executor,
        }
    }
}

#[async_trait]
impl DeliveryStrategy for ChatDelivery {
    fn name(&self) -> &'static str {
        "chat"
    }

    #[instrument(skip(self, ctx, file), fields(chat = %ctx.chat, file = %file.display()))]
    async fn deliver(&self, ctx: &DeliveryContext, file: &Path) -> Result<(), DeliveryError> {
        let sent = self
            .executor
            .run("send_document", || {
                self.channel.send_document(ctx.chat, file, None)
            })
            .await?;

        let delivered = DeliveredFile::new(sent.file_token);
        put_file_token(
            self.state.as_ref(),
            &delivered.content_hash,
            &delivered.file_token,
        )
        .await?;

        let button = InlineAction::new(
            notice::GRAYSCALE_BUTTON,
            &CallbackCommand::ConvertToGrayscale(delivered.content_hash.clone()),
        );
        self.executor
            .run("edit_actions", || {
                self.channel
                    .edit_actions(ctx.chat, sent.message_id, slice::from_ref(&button))
            })
            .await?;

        debug!(hash = %delivered.content_hash, "photo sent");
        Ok(())
    }

    async fn finish(&self, ctx: &DeliveryContext) -> Result<(), DeliveryError> {
        self.channel
            .send_message(ctx.chat, notice::ALL_SENT, &[])
            .await?;
        Ok(())
    }
}
