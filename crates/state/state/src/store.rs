use async_trait::async_trait;

use crate::error::StateError;
use crate::key::StateKey;

/// Trait for persisting small string records.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Check if a key exists; if not, set it atomically.
    /// Returns `true` if the key was newly set, `false` if it already existed.
    async fn check_and_set(&self, key: &StateKey, value: &str) -> Result<bool, StateError>;

    /// Get the value for a key. Returns `None` if not found.
    async fn get(&self, key: &StateKey) -> Result<Option<String>, StateError>;

    /// Set a value, overwriting any previous value.
    async fn set(&self, key: &StateKey, value: &str) -> Result<(), StateError>;

    /// Delete a key. Returns `true` if the key existed.
    async fn delete(&self, key: &StateKey) -> Result<bool, StateError>;
}
