use std::time::Duration;

use darkroom_provider::ProviderError;
use thiserror::Error;

/// Errors specific to the Yandex Disk client.
#[derive(Debug, Error)]
pub enum YandexDiskError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Any non-success status the endpoint does not document as benign.
    #[error("Yandex Disk API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<YandexDiskError> for ProviderError {
    fn from(err: YandexDiskError) -> Self {
        match err {
            YandexDiskError::Http(e) => ProviderError::Connection(e.to_string()),
            YandexDiskError::Timeout(d) => ProviderError::Timeout(d),
            YandexDiskError::Api { status, body } => ProviderError::Api { status, body },
            YandexDiskError::NotFound(path) => ProviderError::NotFound(path),
            YandexDiskError::InvalidResponse(msg) => ProviderError::Serialization(msg),
            YandexDiskError::Io(e) => ProviderError::Io(e),
        }
    }
}
