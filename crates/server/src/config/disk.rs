use secrecy::SecretString;
use serde::Deserialize;

/// `[disk]` section: the cloud storage used for cloud delivery.
#[derive(Debug, Default, Deserialize)]
pub struct DiskSection {
    /// OAuth token. Usually supplied through `DARKROOM_DISK_TOKEN`.
    pub oauth_token: Option<SecretString>,
    /// Override for the REST API base URL.
    pub api_base_url: Option<String>,
    /// Timeout for a single file upload, in seconds.
    pub upload_timeout_seconds: Option<u64>,
}
