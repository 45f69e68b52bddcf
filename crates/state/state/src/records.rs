//! Typed accessors for the two records darkroom persists.
//!
//! Values are stored as JSON so any [`StateStore`] backend can hold them.

use darkroom_core::{ClientFolderRecord, ContentHash, FileToken, OwnerId};

use crate::error::StateError;
use crate::key::StateKey;
use crate::store::StateStore;

/// Insert or replace the folder record of `record.owner_id`.
///
/// # Errors
///
/// Returns [`StateError`] if serialization or the backend write fails.
pub async fn put_client_folder(
    store: &dyn StateStore,
    record: &ClientFolderRecord,
) -> Result<(), StateError> {
    let value = serde_json::to_string(record)?;
    store
        .set(&StateKey::client_folder(record.owner_id), &value)
        .await
}

/// Look up the folder record of `owner`.
///
/// # Errors
///
/// Returns [`StateError`] if the backend read fails or the stored value is
/// not a valid record.
pub async fn get_client_folder(
    store: &dyn StateStore,
    owner: OwnerId,
) -> Result<Option<ClientFolderRecord>, StateError> {
    store
        .get(&StateKey::client_folder(owner))
        .await?
        .map(|raw| serde_json::from_str(&raw).map_err(StateError::from))
        .transpose()
}

/// Remember `token` under `hash`.
///
/// The hash is derived from the token, so an existing entry already holds
/// the same value and is left alone.
///
/// # Errors
///
/// Returns [`StateError`] if the backend write fails.
pub async fn put_file_token(
    store: &dyn StateStore,
    hash: &ContentHash,
    token: &FileToken,
) -> Result<(), StateError> {
    store
        .check_and_set(&StateKey::file_token(hash), token.as_str())
        .await?;
    Ok(())
}

/// Resolve a content hash back to its file token.
///
/// # Errors
///
/// Returns [`StateError`] if the backend read fails.
pub async fn get_file_token(
    store: &dyn StateStore,
    hash: &ContentHash,
) -> Result<Option<FileToken>, StateError> {
    Ok(store
        .get(&StateKey::file_token(hash))
        .await?
        .map(FileToken::from))
}
