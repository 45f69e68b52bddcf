use std::collections::HashSet;

use async_trait::async_trait;

use darkroom_core::PhoneNumber;

use crate::error::ProviderError;

/// Registry of clients allowed to start a session.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// Return every known client phone number.
    ///
    /// Implementations paginate internally; callers see one complete set.
    async fn list_known_phone_numbers(&self) -> Result<HashSet<PhoneNumber>, ProviderError>;

    /// Whether `phone` belongs to a known client.
    async fn is_known(&self, phone: &PhoneNumber) -> Result<bool, ProviderError> {
        Ok(self.list_known_phone_numbers().await?.contains(phone))
    }
}
