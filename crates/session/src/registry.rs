//! The one-slot session registry.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::controller::ActiveSession;
use crate::error::SessionError;

/// Holds the currently active session, if any.
///
/// Acquiring checks and fills the slot under a single lock, so two
/// concurrent starts can never both succeed.
#[derive(Default)]
pub struct SessionRegistry {
    slot: Mutex<Option<Arc<ActiveSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` if the slot is empty.
    pub fn try_acquire(&self, session: Arc<ActiveSession>) -> Result<(), SessionError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(SessionError::Busy);
        }
        *slot = Some(session);
        Ok(())
    }

    /// Clear the slot if it still holds session `id`. Returns whether it did.
    pub fn release(&self, id: Uuid) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|s| s.id() == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<Arc<ActiveSession>> {
        self.slot.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.lock().is_some()
    }
}
