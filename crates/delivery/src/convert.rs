//! On-demand grayscale copies of delivered photos.

use std::path::Path;
use std::sync::Arc;

use darkroom_core::{ChatId, ContentHash, MessageId};
use darkroom_executor::RetryExecutor;
use darkroom_ingest::IngestError;
use darkroom_ingest::transform::grayscale;
use darkroom_provider::ChatChannel;
use darkroom_state::{StateStore, get_file_token};
use tracing::{info, instrument};

use crate::error::DeliveryError;

/// Turns a previously delivered photo into a black-and-white copy and sends
/// it to the same chat.
pub struct GrayscaleConversion {
    channel: Arc<dyn ChatChannel>,
    state: Arc<dyn StateStore>,
    executor: RetryExecutor,
}

impl GrayscaleConversion {
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

    /// Convert the photo behind `hash`.
    ///
    /// `message` is the chat message carrying the original; its button is
    /// removed first so the conversion is offered only once. The converted
    /// file is named `bw_<original stem>.jpg` and lives in a temporary
    /// directory that is deleted whether or not the send succeeds.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::UnknownHash`] if `hash` was never recorded,
    /// [`DeliveryError::Retries`] if the channel kept failing.
    #[instrument(skip(self), fields(chat = %chat, hash = %hash))]
    pub async fn convert(
        &self,
        chat: ChatId,
        message: MessageId,
        hash: &ContentHash,
        original_name: &str,
    ) -> Result<MessageId, DeliveryError> {
        let token = get_file_token(self.state.as_ref(), hash)
            .await?
            .ok_or_else(|| DeliveryError::UnknownHash(hash.clone()))?;

        self.executor
            .run("remove_button", || self.channel.edit_actions(chat, message, &[]))
            .await?;

        let original = self
            .executor
            .run("fetch_file", || self.channel.fetch_file_bytes(&token))
            .await?;
        let converted = tokio::task::spawn_blocking(move || grayscale(&original))
            .await
            .map_err(|e| IngestError::Io(std::io::Error::other(e)))??;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join(output_name(original_name));
        tokio::fs::write(&path, &converted).await?;

        let sent = self
            .executor
            .run("send_document", || self.channel.send_document(chat, &path, None))
            .await;
        drop(dir);

        let sent = sent?;
        info!(message_id = %sent.message_id, "grayscale copy sent");
        Ok(sent.message_id)
    }
}

fn output_name(original_name: &str) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "photo".to_owned());
    format!("bw_{stem}.jpg")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use darkroom_core::FileToken;
    use darkroom_executor::{ExecutorConfig, RetryStrategy};
    use darkroom_provider::ProviderError;
    use darkroom_provider::testing::{ChannelCall, RecordingChannel};
    use darkroom_state::put_file_token;
    use darkroom_state_memory::MemoryStateStore;
    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    const CHAT: ChatId = ChatId::new(42);

    fn png() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        RgbImage::from_pixel(6, 4, Rgb([10, 200, 30]))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn fast_executor() -> RetryExecutor {
        RetryExecutor::new(ExecutorConfig {
            max_attempts: 3,
            retry_strategy: RetryStrategy::Constant {
                delay: Duration::from_millis(1),
            },
        })
    }

    async fn setup() -> (Arc<RecordingChannel>, Arc<MemoryStateStore>, ContentHash) {
        let channel = Arc::new(RecordingChannel::new());
        let state = Arc::new(MemoryStateStore::new());
        let token = FileToken::new("orig-1");
        channel.store_file(token.clone(), png());
        let hash = ContentHash::of(&token);
        put_file_token(state.as_ref(), &hash, &token).await.unwrap();
        (channel, state, hash)
    }

    #[test]
    fn output_names() {
        assert_eq!(output_name("IMG_0001.JPG"), "bw_IMG_0001.jpg");
        assert_eq!(output_name("a.b.png"), "bw_a.b.jpg");
        assert_eq!(output_name(""), "bw_photo.jpg");
    }

    #[tokio::test]
    async fn sends_grayscale_copy_and_removes_button() {
        let (channel, state, hash) = setup().await;
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());

        conversion
            .convert(CHAT, MessageId::new(7), &hash, "IMG_0001.jpg")
            .await
            .unwrap();

        let calls = channel.calls();
        assert!(calls.contains(&ChannelCall::EditActions {
            chat: CHAT,
            message: MessageId::new(7),
            actions: vec![],
        }));
        let docs = channel.sent_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "bw_IMG_0001.jpg");

        let bytes = channel.fetch_file_bytes(&docs[0].1).await.unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
        assert_eq!((decoded.width(), decoded.height()), (6, 4));
    }

    #[tokio::test]
    async fn unknown_hash_is_reported() {
        let (channel, state, _) = setup().await;
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());
        let unknown = ContentHash::of(&FileToken::new("never-sent"));

        let err = conversion
            .convert(CHAT, MessageId::new(7), &unknown, "x.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::UnknownHash(h) if h == unknown));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_send_still_removes_converted_file() {
        let (channel, state, hash) = setup().await;
        channel.fail_sends((0..3).map(|_| ProviderError::Connection("reset".into())));
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());

        let err = conversion
            .convert(CHAT, MessageId::new(7), &hash, "IMG_0002.jpg")
            .await
            .unwrap_err();
        assert!(err.is_exhausted());

        let attempted = channel.document_paths();
        assert_eq!(attempted.len(), 3);
        for path in &attempted {
            assert_eq!(path.file_name().unwrap(), "bw_IMG_0002.jpg");
            assert!(!path.exists(), "{} left behind", path.display());
            assert!(!path.parent().unwrap().exists());
        }
    }

    #[tokio::test]
    async fn rejected_send_still_removes_converted_file() {
        let (channel, state, hash) = setup().await;
        channel.fail_sends([ProviderError::Api {
            status: 413,
            body: "too large".into(),
        }]);
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());

        let err = conversion
            .convert(CHAT, MessageId::new(7), &hash, "IMG_0003.jpg")
            .await
            .unwrap_err();
        assert!(!err.is_exhausted());

        let attempted = channel.document_paths();
        assert_eq!(attempted.len(), 1);
        assert!(!attempted[0].exists());
    }

    #[tokio::test]
    async fn successful_send_removes_converted_file() {
        let (channel, state, hash) = setup().await;
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());

        conversion
            .convert(CHAT, MessageId::new(7), &hash, "IMG_0004.jpg")
            .await
            .unwrap();

        let sent = channel.calls().into_iter().find_map(|call| match call {
            ChannelCall::SendDocument { path, .. } => Some(path),
            _ => None,
        });
        assert!(!sent.expect("document sent").exists());
    }

    #[tokio::test]
    async fn exhausted_fetch_sends_nothing() {
        let (channel, state, hash) = setup().await;
        channel.fail_fetches((0..3).map(|_| ProviderError::Connection("reset".into())));
        let conversion = GrayscaleConversion::new(channel.clone(), state, fast_executor());

        let err = conversion
            .convert(CHAT, MessageId::new(7), &hash, "x.jpg")
            .await
            .unwrap_err();
        assert!(err.is_exhausted());
        assert!(channel.sent_documents().is_empty());
    }
}
