use darkroom_provider::ProviderError;
use thiserror::Error;

/// Errors specific to the YClients directory.
#[derive(Debug, Error)]
pub enum YClientsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<YClientsError> for ProviderError {
    fn from(err: YClientsError) -> Self {
        match err {
            YClientsError::Http(e) => ProviderError::Connection(e.to_string()),
            YClientsError::InvalidResponse(msg) => ProviderError::Serialization(msg),
        }
    }
}
