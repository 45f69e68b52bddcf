use darkroom_ingest::IngestError;
use darkroom_state::StateError;
use thiserror::Error;

/// Errors returned by the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Another session already holds the slot.
    #[error("a session is already active")]
    Busy,

    /// The caller does not own the active session.
    #[error("session belongs to another owner")]
    NotOwner,

    /// There is no active session.
    #[error("no active session")]
    NotActive,

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture folder could not be watched.
    #[error("watch error: {0}")]
    Watch(#[from] IngestError),
}
