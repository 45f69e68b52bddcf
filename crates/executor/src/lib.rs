//! Retry-with-exponential-backoff wrapper used for every network operation
//! in darkroom: chat deliveries, cloud uploads and on-demand file fetches.

pub mod config;
pub mod error;
pub mod executor;
pub mod retry;

pub use config::ExecutorConfig;
pub use error::{ExecutorError, Retryable};
pub use executor::RetryExecutor;
pub use retry::RetryStrategy;
