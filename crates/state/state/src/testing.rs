use std::path::PathBuf;

use darkroom_core::{ClientFolderRecord, ContentHash, FileToken, OwnerId, PhoneNumber};

use crate::error::StateError;
use crate::key::{KeyKind, StateKey};
use crate::records;
use crate::store::StateStore;

fn test_key(id: &str) -> StateKey {
    StateKey::new(KeyKind::Custom("test".into()), id)
}

/// Run the full state store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_store_conformance_tests(store: &dyn StateStore) -> Result<(), StateError> {
    test_get_missing(store).await?;
    test_set_and_get(store).await?;
    test_set_overwrites(store).await?;
    test_check_and_set_new(store).await?;
    test_check_and_set_existing(store).await?;
    test_delete(store).await?;
    test_client_folder_upsert(store).await?;
    test_file_token_roundtrip(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn StateStore) -> Result<(), StateError> {
    let val = store.get(&test_key("missing")).await?;
    assert!(val.is_none(), "get on missing key should return None");
    Ok(())
}

async fn test_set_and_get(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key("set-get");
    store.set(&key, "hello").await?;
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("hello"));
    Ok(())
}

async fn test_set_overwrites(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key("overwrite");
    store.set(&key, "v1").await?;
    store.set(&key, "v2").await?;
    assert_eq!(store.get(&key).await?.as_deref(), Some("v2"));
    Ok(())
}

async fn test_check_and_set_new(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key("cas-new");
    let created = store.check_and_set(&key, "v1").await?;
    assert!(created, "check_and_set on new key should return true");
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("v1"));
    Ok(())
}

async fn test_check_and_set_existing(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key("cas-existing");
    store.set(&key, "v1").await?;
    let created = store.check_and_set(&key, "v2").await?;
    assert!(
        !created,
        "check_and_set on existing key should return false"
    );
    let val = store.get(&key).await?;
    assert_eq!(val.as_deref(), Some("v1"), "original value should remain");
    Ok(())
}

async fn test_delete(store: &dyn StateStore) -> Result<(), StateError> {
    let key = test_key("to-delete");
    store.set(&key, "bye").await?;
    let existed = store.delete(&key).await?;
    assert!(existed, "delete should return true for existing key");
    let val = store.get(&key).await?;
    assert!(val.is_none(), "get after delete should return None");

    let existed = store.delete(&key).await?;
    assert!(!existed, "delete on missing key should return false");
    Ok(())
}

async fn test_client_folder_upsert(store: &dyn StateStore) -> Result<(), StateError> {
    let owner = OwnerId::new(7_000_001);
    let missing = records::get_client_folder(store, owner).await?;
    assert!(missing.is_none());

    let first = ClientFolderRecord::new(
        owner,
        PhoneNumber::normalize("89160000001").map_err(|e| StateError::Backend(e.to_string()))?,
        PathBuf::from("/clients/+79160000001"),
    );
    records::put_client_folder(store, &first).await?;

    let second = ClientFolderRecord::new(
        owner,
        PhoneNumber::normalize("89160000002").map_err(|e| StateError::Backend(e.to_string()))?,
        PathBuf::from("/clients/+79160000002"),
    );
    records::put_client_folder(store, &second).await?;

    let stored = records::get_client_folder(store, owner).await?;
    assert_eq!(stored, Some(second), "second upsert should replace the first");
    Ok(())
}

async fn test_file_token_roundtrip(store: &dyn StateStore) -> Result<(), StateError> {
    let token = FileToken::from("BQACAgIAAxkBAAIC");
    let hash = ContentHash::of(&token);
    assert!(records::get_file_token(store, &hash).await?.is_none());

    records::put_file_token(store, &hash, &token).await?;
    records::put_file_token(store, &hash, &token).await?;
    assert_eq!(records::get_file_token(store, &hash).await?, Some(token));
    Ok(())
}
