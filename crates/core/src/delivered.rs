use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::types::FileToken;

/// Number of digest bytes kept in a [`ContentHash`].
const HASH_BYTES: usize = 16;

/// Short reference derived from a [`FileToken`].
///
/// Remote file tokens are too long for interactive callback payloads, so the
/// delivery pipeline stores `hash -> token` and round-trips only the hash.
/// The value is the first 16 bytes of the SHA-256 digest of the token,
/// hex-encoded (32 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Derive the hash for a file token.
    ///
    /// ```
    /// use darkroom_core::{ContentHash, FileToken};
    ///
    /// let a = ContentHash::of(&FileToken::new("token-a"));
    /// assert_eq!(a, ContentHash::of(&FileToken::new("token-a")));
    /// assert_eq!(a.as_str().len(), 32);
    /// ```
    #[must_use]
    pub fn of(token: &FileToken) -> Self {
        let digest = Sha256::digest(token.as_str().as_bytes());
        Self(hex::encode(&digest[..HASH_BYTES]))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == HASH_BYTES * 2
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(CoreError::InvalidContentHash(s.to_owned()))
        }
    }
}

impl TryFrom<String> for ContentHash {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Record of a file handed to the chat channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredFile {
    pub file_token: FileToken,
    pub content_hash: ContentHash,
}

impl DeliveredFile {
    #[must_use]
    pub fn new(file_token: FileToken) -> Self {
        let content_hash = ContentHash::of(&file_token);
        Self {
            file_token,
            content_hash,
        }
    }
}
