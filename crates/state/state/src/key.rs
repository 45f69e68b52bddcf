use serde::{Deserialize, Serialize};

use darkroom_core::{ContentHash, OwnerId};

/// The kind of record being stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Destination folder of an owner's most recent session.
    ClientFolder,
    /// Channel file token addressed by its content hash.
    FileToken,
    Custom(String),
}

impl KeyKind {
    /// Return a string representation of the key kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClientFolder => "client_folder",
            Self::FileToken => "file_token",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key used to address entries in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub kind: KeyKind,
    pub id: String,
}

impl StateKey {
    /// Create a new state key.
    #[must_use]
    pub fn new(kind: KeyKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Key of the folder record owned by `owner`.
    #[must_use]
    pub fn client_folder(owner: OwnerId) -> Self {
        Self::new(KeyKind::ClientFolder, owner.to_string())
    }

    /// Key of the file token stored under `hash`.
    #[must_use]
    pub fn file_token(hash: &ContentHash) -> Self {
        Self::new(KeyKind::FileToken, hash.as_str())
    }

    /// Return a canonical string representation: `kind:id`
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darkroom_core::FileToken;

    #[test]
    fn key_kind_as_str() {
        assert_eq!(KeyKind::ClientFolder.as_str(), "client_folder");
        assert_eq!(KeyKind::FileToken.as_str(), "file_token");
        assert_eq!(KeyKind::Custom("foo".into()).as_str(), "foo");
    }

    #[test]
    fn state_key_canonical() {
        let key = StateKey::new(KeyKind::Custom("misc".into()), "abc");
        assert_eq!(key.canonical(), "misc:abc");
    }

    #[test]
    fn typed_constructors() {
        assert_eq!(
            StateKey::client_folder(OwnerId::new(42)).canonical(),
            "client_folder:42"
        );
        let hash = ContentHash::of(&FileToken::from("tok"));
        let key = StateKey::file_token(&hash);
        assert_eq!(key.kind, KeyKind::FileToken);
        assert_eq!(key.id, hash.as_str());
    }
}
