use std::sync::Arc;

use darkroom_state::StateStore;
use darkroom_state_memory::MemoryStateStore;
use darkroom_state_sqlite::{SqliteConfig, SqliteStateStore};
use tracing::info;

use crate::config::StateConfig;
use crate::error::ServerError;

/// Construct a `StateStore` from configuration.
///
/// The `sqlite` backend creates its table on connect, so this also serves
/// the `migrate` command.
pub async fn create_state(config: &StateConfig) -> Result<Arc<dyn StateStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStateStore::new())),
        "sqlite" => create_sqlite(config).await,
        other => Err(ServerError::Config(format!(
            "unsupported state backend: {other}"
        ))),
    }
}

async fn create_sqlite(config: &StateConfig) -> Result<Arc<dyn StateStore>, ServerError> {
    let defaults = SqliteConfig::default();
    let sqlite_config = SqliteConfig {
        url: config.url.clone().unwrap_or(defaults.url),
        table_prefix: config.prefix.clone().unwrap_or(defaults.table_prefix),
        ..SqliteConfig::default()
    };
    let store = SqliteStateStore::new(sqlite_config).await?;
    info!(url = config.url.as_deref().unwrap_or("sqlite://darkroom.db"), "sqlite state store ready");
    Ok(Arc::new(store))
}
