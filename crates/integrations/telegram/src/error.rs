use std::time::Duration;

use darkroom_provider::ProviderError;
use thiserror::Error;

/// Errors specific to the Telegram channel.
///
/// These are internal errors that get converted into [`ProviderError`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The Bot API answered with `ok: false`.
    #[error("Telegram API error ({status}): {description}")]
    Api { status: u16, description: String },

    /// The Bot API answered `ok: true` but the result was not what the
    /// method promises.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A local file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TelegramError> for ProviderError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Http(e) => ProviderError::Connection(e.to_string()),
            TelegramError::Timeout(d) => ProviderError::Timeout(d),
            TelegramError::Api {
                status,
                description,
            } => ProviderError::Api {
                status,
                body: description,
            },
            TelegramError::InvalidResponse(msg) => ProviderError::Serialization(msg),
            TelegramError::Io(e) => ProviderError::Io(e),
        }
    }
}
