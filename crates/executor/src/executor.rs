use std::fmt::Display;
use std::future::Future;

use tracing::{debug, instrument, warn};

use crate::config::ExecutorConfig;
use crate::error::{ExecutorError, Retryable};

/// Runs asynchronous operations with retry-on-transient-failure semantics.
///
/// Each transient failure is followed by a pause computed by the configured
/// [`RetryStrategy`](crate::RetryStrategy), including the failure of the
/// final attempt, after which [`ExecutorError::RetriesExhausted`] is
/// returned. Non-retryable errors fail immediately.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: ExecutorConfig,
}

impl RetryExecutor {
    /// Create a new executor from the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use darkroom_executor::{ExecutorConfig, RetryExecutor};
    ///
    /// let executor = RetryExecutor::new(ExecutorConfig::default());
    /// assert_eq!(executor.config().max_attempts, 5);
    /// ```
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Return a reference to the executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// `name` is only used for logging.
    #[instrument(skip(self, operation), fields(attempt))]
    pub async fn run<T, E, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, ExecutorError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            tracing::Span::current().record("attempt", attempt);
            debug!(operation = name, attempt, max_attempts, "running operation");

            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                warn!(operation = name, attempt, error = %err, "operation failed permanently");
                return Err(ExecutorError::Permanent(err));
            }

            let delay = self.config.retry_strategy.delay_for(attempt);
            warn!(
                operation = name,
                attempt,
                error = %err,
                delay_ms = %delay.as_millis(),
                "transient failure, backing off"
            );
            tokio::time::sleep(delay).await;

            attempt += 1;
            if attempt >= max_attempts {
                warn!(operation = name, attempts = attempt, "retries exhausted");
                return Err(ExecutorError::RetriesExhausted {
                    attempts: attempt,
                    last: err,
                });
            }
        }
    }
}
