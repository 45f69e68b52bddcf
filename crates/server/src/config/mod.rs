mod delivery;
mod disk;
mod folders;
mod ingest;
mod logging;
mod retry;
mod session;
mod state;
mod telegram;
mod yclients;


pub use delivery::*;
pub use disk::*;
pub use folders::*;
pub use ingest::*;
pub use logging::*;
pub use retry::*;
pub use session::*;
pub use state::*;
pub use telegram::*;
pub use yclients::*;

use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ServerError;

/// Environment variable overriding `[telegram] bot_token`.
pub const ENV_BOT_TOKEN: &str = "DARKROOM_BOT_TOKEN";
/// Environment variable overriding `[disk] oauth_token`.
pub const ENV_DISK_TOKEN: &str = "DARKROOM_DISK_TOKEN";
/// Environment variable overriding `[yclients] partner_token`.
pub const ENV_YCLIENTS_PARTNER_TOKEN: &str = "DARKROOM_YCLIENTS_PARTNER_TOKEN";
/// Environment variable overriding `[yclients] user_token`.
pub const ENV_YCLIENTS_USER_TOKEN: &str = "DARKROOM_YCLIENTS_USER_TOKEN";

/// Top-level configuration for the darkroom bot, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct DarkroomConfig {
    /// Chat channel (Telegram bot) settings.
    #[serde(default)]
    pub telegram: TelegramSection,
    /// Cloud storage (Yandex Disk) settings.
    #[serde(default)]
    pub disk: DiskSection,
    /// Client directory (YClients) settings.
    #[serde(default)]
    pub yclients: YClientsSection,
    /// Watch and destination folders.
    #[serde(default)]
    pub folders: FoldersConfig,
    /// Session timeout settings.
    #[serde(default)]
    pub session: SessionSection,
    /// Delivery polling settings.
    #[serde(default)]
    pub delivery: DeliverySection,
    /// Photo acceptance settings.
    #[serde(default)]
    pub ingest: IngestSection,
    /// Backoff for network calls.
    #[serde(default)]
    pub retry: RetrySection,
    /// State backend.
    #[serde(default)]
    pub state: StateConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DarkroomConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load the configuration at `path`, falling back to defaults when the
    /// file does not exist, then apply secrets from the environment.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let mut config = if path.exists() {
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Replace secrets with values returned by `lookup`, keyed by the
    /// `ENV_*` variable names. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let secret = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::new)
        };
        if let Some(token) = secret(ENV_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(token) = secret(ENV_DISK_TOKEN) {
            self.disk.oauth_token = Some(token);
        }
        if let Some(token) = secret(ENV_YCLIENTS_PARTNER_TOKEN) {
            self.yclients.partner_token = Some(token);
        }
        if let Some(token) = secret(ENV_YCLIENTS_USER_TOKEN) {
            self.yclients.user_token = Some(token);
        }
    }

    /// Check that everything needed to run the bot is present and sane.
    pub fn validate(&self) -> Result<(), ServerError> {
        let mut missing = Vec::new();
        if !has_secret(self.telegram.bot_token.as_ref()) {
            missing.push("telegram.bot_token");
        }
        if !has_secret(self.disk.oauth_token.as_ref()) {
            missing.push("disk.oauth_token");
        }
        if !has_secret(self.yclients.partner_token.as_ref()) {
            missing.push("yclients.partner_token");
        }
        if !has_secret(self.yclients.user_token.as_ref()) {
            missing.push("yclients.user_token");
        }
        if self.yclients.company_id.is_none() {
            missing.push("yclients.company_id");
        }
        if !missing.is_empty() {
            return Err(ServerError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.folders.watch == self.folders.clients {
            return Err(ServerError::Config(
                "folders.watch and folders.clients must differ".into(),
            ));
        }
        if self.session.idle_check_seconds == 0 || self.delivery.check_interval_seconds == 0 {
            return Err(ServerError::Config(
                "polling intervals must be at least one second".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ServerError::Config(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn has_secret(secret: Option<&SecretString>) -> bool {
    secret.is_some_and(|s| !s.expose_secret().trim().is_empty())
}

/// The secret's value, or an empty string if unset. Only called after
/// [`DarkroomConfig::validate`].
pub(crate) fn secret_value(secret: Option<&SecretString>) -> String {
    secret
        .map(|s| s.expose_secret().clone())
        .unwrap_or_default()
}
