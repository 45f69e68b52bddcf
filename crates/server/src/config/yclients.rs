use secrecy::SecretString;
use serde::Deserialize;

/// `[yclients]` section: the directory of registered clients.
#[derive(Debug, Default, Deserialize)]
pub struct YClientsSection {
    pub partner_token: Option<SecretString>,
    pub user_token: Option<SecretString>,
    pub company_id: Option<u64>,
    pub api_base_url: Option<String>,
    /// Clients requested per page. Defaults to 200.
    pub page_size: Option<u32>,
}
