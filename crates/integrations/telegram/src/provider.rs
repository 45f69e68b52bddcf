use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use darkroom_core::{ChatId, FileToken, InlineAction, MessageId};
use darkroom_provider::{ChatChannel, ProviderError, SentDocument};

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, EditReplyMarkupRequest, File,
    GetFileRequest, GetUpdatesRequest, InlineKeyboardMarkup, Message, SendDocumentByIdRequest,
    SendMessageRequest, SendPhotoByIdRequest, Update,
};

/// Chat channel backed by the Telegram Bot API.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: Client,
}

impl TelegramChannel {
    /// Create a new channel with the given configuration.
    pub fn new(config: TelegramConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    /// Create a new channel with a custom HTTP client.
    pub fn with_client(config: TelegramConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn transport_error(&self, err: reqwest::Error) -> TelegramError {
        if err.is_timeout() {
            TelegramError::Timeout(self.config.request_timeout)
        } else {
            TelegramError::Http(err)
        }
    }

    /// Call a JSON method and unwrap the `result` field.
    async fn call<Req, Res>(&self, method: &str, body: &Req) -> Result<Res, TelegramError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.interpret_response(method, response).await
    }

    /// Decode the API envelope, turning `ok: false` into [`TelegramError::Api`].
    async fn interpret_response<Res: DeserializeOwned>(
        &self,
        method: &str,
        response: reqwest::Response,
    ) -> Result<Res, TelegramError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        let envelope: ApiResponse<Res> = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                TelegramError::InvalidResponse(format!("{method}: {e}"))
            } else {
                TelegramError::Api {
                    status: status.as_u16(),
                    description: text.clone(),
                }
            }
        })?;

        if !envelope.ok {
            let status = envelope.error_code.unwrap_or_else(|| status.as_u16());
            let description = envelope.description.unwrap_or_default();
            warn!(method, status, %description, "Telegram API call failed");
            return Err(TelegramError::Api {
                status,
                description,
            });
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::InvalidResponse(format!("{method}: missing result")))
    }

    /// Fetch pending updates starting at `offset`, waiting up to the
    /// configured long-poll timeout.
    #[instrument(skip(self), fields(provider = "telegram"))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, ProviderError> {
        let body = GetUpdatesRequest {
            offset,
            timeout: self.config.poll_timeout_secs,
            allowed_updates: vec!["message", "callback_query"],
        };
        let poll = std::time::Duration::from_secs(u64::from(self.config.poll_timeout_secs));
        let response = self
            .client
            .post(self.config.method_url("getUpdates"))
            .timeout(poll + self.config.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        Ok(self.interpret_response("getUpdates", response).await?)
    }
}

fn markup(actions: &[InlineAction]) -> Option<InlineKeyboardMarkup> {
    (!actions.is_empty()).then(|| InlineKeyboardMarkup::from_actions(actions))
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    #[instrument(skip(self, text, actions), fields(provider = "telegram"))]
    async fn send_message(
        &self,
        chat: ChatId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<MessageId, ProviderError> {
        let request = SendMessageRequest {
            chat_id: chat.get(),
            text,
            reply_markup: markup(actions),
        };
        let message: Message = self.call("sendMessage", &request).await?;
        Ok(MessageId::new(message.message_id))
    }

    #[instrument(skip(self, text, actions), fields(provider = "telegram"))]
    async fn edit_message(
        &self,
        chat: ChatId,
        message: MessageId,
        text: &str,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError> {
        let request = EditMessageTextRequest {
            chat_id: chat.get(),
            message_id: message.get(),
            text,
            reply_markup: markup(actions),
        };
        let _: serde_json::Value = self.call("editMessageText", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, actions), fields(provider = "telegram"))]
    async fn edit_actions(
        &self,
        chat: ChatId,
        message: MessageId,
        actions: &[InlineAction],
    ) -> Result<(), ProviderError> {
        // An empty keyboard removes the buttons.
        let request = EditReplyMarkupRequest {
            chat_id: chat.get(),
            message_id: message.get(),
            reply_markup: InlineKeyboardMarkup::from_actions(actions),
        };
        let _: serde_json::Value = self.call("editMessageReplyMarkup", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, path, caption), fields(provider = "telegram", path = %path.display()))]
    async fn send_document(
        &self,
        chat: ChatId,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<SentDocument, ProviderError> {
        let data = tokio::fs::read(path).await.map_err(TelegramError::Io)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "document".to_owned(), |n| n.to_string_lossy().into_owned());

        debug!(bytes = data.len(), %file_name, "uploading document");

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat.get().to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(data).file_name(file_name),
            );
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_owned());
        }

        let response = self
            .client
            .post(self.config.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let message: Message = self.interpret_response("sendDocument", response).await?;

        let document = message.document.ok_or_else(|| {
            TelegramError::InvalidResponse("sendDocument: message has no document".into())
        })?;
        Ok(SentDocument {
            file_token: FileToken::new(document.file_id),
            message_id: MessageId::new(message.message_id),
        })
    }

    #[instrument(skip(self, token, caption), fields(provider = "telegram"))]
    async fn send_document_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        caption: Option<&str>,
    ) -> Result<MessageId, ProviderError> {
        let request = SendDocumentByIdRequest {
            chat_id: chat.get(),
            document: token.as_str(),
            caption,
        };
        let message: Message = self.call("sendDocument", &request).await?;
        Ok(MessageId::new(message.message_id))
    }

    #[instrument(skip(self, token, caption), fields(provider = "telegram"))]
    async fn send_photo_by_token(
        &self,
        chat: ChatId,
        token: &FileToken,
        caption: Option<&str>,
    ) -> Result<MessageId, ProviderError> {
        let request = SendPhotoByIdRequest {
            chat_id: chat.get(),
            photo: token.as_str(),
            caption,
        };
        let message: Message = self.call("sendPhoto", &request).await?;
        Ok(MessageId::new(message.message_id))
    }

    #[instrument(skip(self, text), fields(provider = "telegram"))]
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), ProviderError> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: callback_id,
            text,
        };
        let _: bool = self.call("answerCallbackQuery", &request).await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(provider = "telegram"))]
    async fn fetch_file_bytes(&self, token: &FileToken) -> Result<Bytes, ProviderError> {
        let file: File = self
            .call(
                "getFile",
                &GetFileRequest {
                    file_id: token.as_str(),
                },
            )
            .await?;
        let file_path = file.file_path.ok_or_else(|| {
            TelegramError::InvalidResponse(format!("getFile: no file_path for {}", file.file_id))
        })?;

        let response = self
            .client
            .get(self.config.file_url(&file_path))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                description: body,
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!(bytes = bytes.len(), "downloaded file");
        Ok(bytes)
    }
}
