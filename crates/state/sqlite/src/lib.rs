mod config;
mod migrations;
mod store;

pub use config::SqliteConfig;
pub use migrations::run_migrations;
pub use store::SqliteStateStore;
