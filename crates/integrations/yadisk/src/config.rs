use std::time::Duration;

use secrecy::SecretString;

/// Configuration for the Yandex Disk storage client.
#[derive(Clone)]
pub struct YandexDiskConfig {
    /// OAuth token with `cloud_api:disk.write` access.
    pub oauth_token: SecretString,

    /// Base URL of the REST API.
    pub api_base_url: String,

    /// Timeout for metadata calls.
    pub request_timeout: Duration,

    /// Timeout for the file body upload.
    pub upload_timeout: Duration,
}

impl std::fmt::Debug for YandexDiskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YandexDiskConfig")
            .field("oauth_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .field("upload_timeout", &self.upload_timeout)
            .finish()
    }
}

impl YandexDiskConfig {
    pub fn new(oauth_token: impl Into<String>) -> Self {
        Self {
            oauth_token: SecretString::new(oauth_token.into()),
            api_base_url: "https://cloud-api.yandex.net".to_owned(),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = YandexDiskConfig::new("y0_token");
        assert_eq!(config.api_base_url, "https://cloud-api.yandex.net");
        assert_eq!(config.upload_timeout, Duration::from_secs(300));
    }

    #[test]
    fn debug_redacts_token() {
        let config = YandexDiskConfig::new("y0_test-placeholder");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-placeholder"));
    }
}
