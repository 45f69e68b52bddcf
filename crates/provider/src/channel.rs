use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;

use darkroom_core::{ChatId, FileToken, InlineAction, MessageId};

use crate::error::ProviderError;

/// Result of uploading a document through the chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentDocument {
    /// Token the channel assigned to the uploaded file.
    pub file_token: FileToken,
    /// Message carrying the document.
    pub message_id: MessageId,
}

/// Messaging front-end used to talk to clients.
///
/// Implementations must be `Send + Sync`; the delivery pipeline and the
/// update dispatcher share one instance behind an `Arc`.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Send a text message, optionally with inline action buttons.
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<MessageId, ProviderError>;

    /// Replace the text (and buttons) of an existing message.
    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError>;

    /// Replace the buttons of an existing message. An empty slice removes them.
    async fn edit_actions(
        &self,
        chat: ChatId,
        message: MessageId,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError>;

    /// Upload a local file as a document attachment.
    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<SentDocument, ProviderError>;

    /// Re-send a document the channel already stores.
    async fn send_document_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        caption: Option<&str>,
    ) -> Result<MessageId, ProviderError>;

    /// Re-send a photo the channel already stores.
    async fn send_photo_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        caption: Option<&str>,
    ) -> Result<MessageId, ProviderError>;

    /// Acknowledge a button press.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ProviderError>;

    /// Download the bytes of a file previously stored by the channel.
    async fn fetch_file_bytes(&self, token: &FileToken) -> Result<Bytes, ProviderError>;
}
