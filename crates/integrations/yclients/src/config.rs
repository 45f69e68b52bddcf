use std::time::Duration;

use secrecy::SecretString;

/// Configuration for the YClients directory.
#[derive(Clone)]
pub struct YClientsConfig {
    /// Partner (application) token.
    pub partner_token: SecretString,

    /// User token of the company account.
    pub user_token: SecretString,

    /// Company whose clients are listed.
    pub company_id: u64,

    /// Base URL of the REST API.
    pub api_base_url: String,

    /// Clients requested per page.
    pub page_size: u32,

    /// Upper bound on pages fetched in one listing.
    pub max_pages: u32,

    /// Timeout applied to each page request.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for YClientsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YClientsConfig")
            .field("partner_token", &"[REDACTED]")
            .field("user_token", &"[REDACTED]")
            .field("company_id", &self.company_id)
            .field("api_base_url", &self.api_base_url)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl YClientsConfig {
    pub fn new(
        partner_token: impl Into<String>,
        user_token: impl Into<String>,
        company_id: u64,
    ) -> Self {
        Self {
            partner_token: SecretString::new(partner_token.into()),
            user_token: SecretString::new(user_token.into()),
            company_id,
            api_base_url: "https://api.yclients.com".to_owned(),
            page_size: 200,
            max_pages: 500,
            request_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub(crate) fn search_url(&self) -> String {
        format!(
            "{}/api/v1/company/{}/clients/search",
            self.api_base_url.trim_end_matches('/'),
            self.company_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_url() {
        let config = YClientsConfig::new("p", "u", 1_148_308);
        assert_eq!(config.page_size, 200);
        assert_eq!(
            config.search_url(),
            "https://api.yclients.com/api/v1/company/1148308/clients/search"
        );
    }

    #[test]
    fn debug_redacts_tokens() {
        let config = YClientsConfig::new("partner-secret", "user-secret", 1);
        let debug = format!("{config:?}");
        assert!(!debug.contains("partner-secret"));
        assert!(!debug.contains("user-secret"));
    }
}
