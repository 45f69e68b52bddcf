//! Telegram Bot API adapter for darkroom.
//!
//! [`TelegramChannel`] implements [`ChatChannel`](darkroom_provider::ChatChannel)
//! over the [Bot API](https://core.telegram.org/bots/api), and
//! [`UpdatePoller`] long-polls `getUpdates` for incoming messages and button
//! presses.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use darkroom_telegram::{TelegramChannel, TelegramConfig};
//!
//! let config = TelegramConfig::new("123456:ABC-DEF").with_poll_timeout(25);
//! let channel = TelegramChannel::new(config);
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod types;
pub mod updates;

#[cfg(test)]
mod test_server;

pub use config::TelegramConfig;
pub use error::TelegramError;
pub use provider::TelegramChannel;
pub use types::{CallbackQuery, Message, Update, User};
pub use updates::UpdatePoller;
