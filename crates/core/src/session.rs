use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phone::PhoneNumber;
use crate::types::OwnerId;

/// One authorized client's bounded-duration photo-capture window.
///
/// This is the immutable part of a session. The mutable activity timestamp
/// lives with the running session in `darkroom-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier; distinguishes consecutive sessions of the
    /// same owner.
    pub id: Uuid,
    /// Identity of the party that started the session.
    pub owner_id: OwnerId,
    /// Client phone number in canonical form.
    pub phone: PhoneNumber,
    /// Shared folder the photographer drops files into.
    pub watch_folder: PathBuf,
    /// Per-phone folder accepted photos are moved into.
    pub destination_folder: PathBuf,
    /// When the session was started.
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a session whose destination folder is `clients_root/<phone>`.
    #[must_use]
    pub fn new(
        owner_id: OwnerId,
        phone: PhoneNumber,
        watch_folder: impl Into<PathBuf>,
        clients_root: &Path,
        started_at: DateTime<Utc>,
    ) -> Self {
        let destination_folder = destination_for(clients_root, &phone);
        Self {
            id: Uuid::new_v4(),
            owner_id,
            phone,
            watch_folder: watch_folder.into(),
            destination_folder,
            started_at,
        }
    }
}

/// Destination folder for a phone number under the clients root.
#[must_use]
pub fn destination_for(clients_root: &Path, phone: &PhoneNumber) -> PathBuf {
    clients_root.join(phone.folder_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_per_phone() {
        let phone = PhoneNumber::normalize("89161234567").unwrap();
        let session = Session::new(
            OwnerId::new(1),
            phone,
            "/srv/photo",
            Path::new("/srv/clients"),
            Utc::now(),
        );
        assert_eq!(
            session.destination_folder,
            PathBuf::from("/srv/clients/+79161234567")
        );
        assert_eq!(session.watch_folder, PathBuf::from("/srv/photo"));
    }

    #[test]
    fn destination_never_leaves_clients_root() {
        let phone = PhoneNumber::normalize("+7/../../etc").unwrap();
        let dest = destination_for(Path::new("/srv/clients"), &phone);
        assert_eq!(dest.parent(), Some(Path::new("/srv/clients")));
    }

    #[test]
    fn each_session_gets_a_fresh_id() {
        let phone = PhoneNumber::normalize("+79161234567").unwrap();
        let root = Path::new("/tmp");
        let a = Session::new(OwnerId::new(1), phone.clone(), "/w", root, Utc::now());
        let b = Session::new(OwnerId::new(1), phone, "/w", root, Utc::now());
        assert_ne!(a.id, b.id);
    }
}
