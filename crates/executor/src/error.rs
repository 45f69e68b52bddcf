use thiserror::Error;

/// Errors that can be classified as transient.
///
/// The executor only retries errors for which [`is_retryable`] returns
/// `true`; everything else fails the operation immediately.
///
/// [`is_retryable`]: Retryable::is_retryable
pub trait Retryable {
    /// Returns `true` if the operation may succeed when attempted again.
    fn is_retryable(&self) -> bool;
}

/// Failure of an operation run through the executor.
#[derive(Debug, Error)]
pub enum ExecutorError<E> {
    /// Every attempt failed with a transient error.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: E,
    },

    /// The operation failed with an error that is not worth retrying.
    #[error("{0}")]
    Permanent(E),
}

impl<E> ExecutorError<E> {
    /// Returns `true` for [`ExecutorError::RetriesExhausted`].
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// Unwrap the underlying error, discarding the retry context.
    pub fn into_inner(self) -> E {
        match self {
            Self::RetriesExhausted { last, .. } | Self::Permanent(last) => last,
        }
    }
}
