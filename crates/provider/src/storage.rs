use std::path::Path;

use async_trait::async_trait;

use crate::error::ProviderError;

/// Outcome of an idempotent folder creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    Created,
    AlreadyExists,
}

/// Object-storage client used by the cloud delivery strategy.
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Create a folder at `path`. An existing folder is not an error.
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, ProviderError>;

    /// Make the folder at `path` publicly readable.
    async fn publish(&self, path: &str) -> Result<(), ProviderError>;

    /// Return the public link of a published resource, if it has one.
    async fn public_link(&self, path: &str) -> Result<Option<String>, ProviderError>;

    /// Upload the local file to `remote_path`.
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ProviderError>;
}
