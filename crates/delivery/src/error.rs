use darkroom_core::{ContentHash, OwnerId};
use darkroom_executor::ExecutorError;
use darkroom_ingest::IngestError;
use darkroom_provider::ProviderError;
use darkroom_state::StateError;
use thiserror::Error;

/// Errors produced while delivering photos.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The owner never started a session, so there is nothing to deliver.
    #[error("no session folder recorded for owner {0}")]
    NoRecord(OwnerId),

    /// A grayscale request referenced a file this service never sent.
    #[error("unknown content hash {0}")]
    UnknownHash(ContentHash),

    /// A collaborator call failed with a non-transient error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A collaborator call kept failing transiently.
    #[error("gave up after {attempts} attempts: {source}")]
    Retries {
        attempts: u32,
        #[source]
        source: ProviderError,
    },

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Ingest(#[from] IngestError),
}

impl DeliveryError {
    /// Returns `true` if the retry budget of an operation was spent.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Retries { .. })
    }
}

impl From<ExecutorError<ProviderError>> for DeliveryError {
    fn from(err: ExecutorError<ProviderError>) -> Self {
        match err {
            ExecutorError::RetriesExhausted { attempts, last } => Self::Retries {
                attempts,
                source: last,
            },
            ExecutorError::Permanent(e) => Self::Provider(e),
        }
    }
}
