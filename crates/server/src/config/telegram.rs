use secrecy::SecretString;
use serde::Deserialize;

/// `[telegram]` section.
///
/// # Example
///
/// ```toml
/// [telegram]
/// bot_token = "123456:ABC-DEF"
/// operator_chat_id = 7375092623
/// register_url = "https://example.yclients.com"
/// ```
#[derive(Debug, Deserialize)]
pub struct TelegramSection {
    /// Bot API token. Usually supplied through `DARKROOM_BOT_TOKEN`.
    pub bot_token: Option<SecretString>,
    /// Override for the Bot API base URL.
    pub api_base_url: Option<String>,
    /// Long-poll window for `getUpdates`, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u32,
    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Chat that receives documents and photos clients send to the bot.
    pub operator_chat_id: Option<i64>,
    /// Sign-up link offered to unknown phone numbers.
    pub register_url: Option<String>,
}

impl Default for TelegramSection {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base_url: None,
            poll_timeout_seconds: default_poll_timeout(),
            request_timeout_seconds: default_request_timeout(),
            operator_chat_id: None,
            register_url: None,
        }
    }
}

fn default_poll_timeout() -> u32 {
    30
}

fn default_request_timeout() -> u64 {
    30
}
