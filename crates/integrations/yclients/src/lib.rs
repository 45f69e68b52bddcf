//! YClients adapter for darkroom.
//!
//! [`YClientsDirectory`] implements
//! [`ClientDirectory`](darkroom_provider::ClientDirectory) by paging through
//! the company's client list.

pub mod config;
pub mod directory;
pub mod error;
pub mod types;

pub use config::YClientsConfig;
pub use directory::YClientsDirectory;
pub use error::YClientsError;
