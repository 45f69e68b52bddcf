use crate::retry::RetryStrategy;

/// Configuration for the [`RetryExecutor`](crate::RetryExecutor).
///
/// # Examples
///
/// ```
/// use darkroom_executor::ExecutorConfig;
///
/// let config = ExecutorConfig::default();
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Strategy used to compute the pause after each transient failure.
    pub retry_strategy: RetryStrategy,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_strategy: RetryStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ExecutorConfig::default();
        assert_eq!(cfg.max_attempts, 5);
        assert_eq!(cfg.retry_strategy, RetryStrategy::default());
    }

    #[test]
    fn config_custom_values() {
        let cfg = ExecutorConfig {
            max_attempts: 2,
            retry_strategy: RetryStrategy::Constant {
                delay: Duration::from_millis(10),
            },
        };
        assert_eq!(cfg.max_attempts, 2);
        assert_eq!(
            cfg.retry_strategy.delay_for(7),
            Duration::from_millis(10)
        );
    }
}
