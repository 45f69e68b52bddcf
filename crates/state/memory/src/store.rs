use async_trait::async_trait;
use dashmap::DashMap;

use darkroom_state::error::StateError;
use darkroom_state::key::StateKey;
use darkroom_state::store::StateStore;

/// In-memory [`StateStore`] backed by a [`DashMap`].
///
/// Contents are lost when the process exits. This implementation is fully
/// synchronous internally; the async trait methods return immediately.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    data: DashMap<String, String>,
}

impl MemoryStateStore {
    /// Create a new, empty in-memory state store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn check_and_set(&self, key: &StateKey, value: &str) -> Result<bool, StateError> {
        // `entry` holds the shard lock, so the check and the insert are atomic.
        let was_inserted = match self.data.entry(key.canonical()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(value.to_owned());
                true
            }
        };
        Ok(was_inserted)
    }

    async fn get(&self, key: &StateKey) -> Result<Option<String>, StateError> {
        Ok(self
            .data
            .get(&key.canonical())
            .map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &StateKey, value: &str) -> Result<(), StateError> {
        self.data.insert(key.canonical(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &StateKey) -> Result<bool, StateError> {
        Ok(self.data.remove(&key.canonical()).is_some())
    }
}
