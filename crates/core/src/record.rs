use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;
use crate::types::OwnerId;

/// Persisted association between a requester and their latest session
/// folder. Writing a record for an owner replaces any previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFolderRecord {
    pub owner_id: OwnerId,
    pub phone: PhoneNumber,
    pub destination_folder: PathBuf,
}

impl ClientFolderRecord {
    #[must_use]
    pub fn new(owner_id: OwnerId, phone: PhoneNumber, destination_folder: PathBuf) -> Self {
        Self {
            owner_id,
            phone,
            destination_folder,
        }
    }
}
