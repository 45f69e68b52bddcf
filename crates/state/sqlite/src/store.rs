use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use darkroom_state::error::StateError;
use darkroom_state::key::StateKey;
use darkroom_state::store::StateStore;

use crate::config::SqliteConfig;
use crate::migrations;

/// `SQLite`-backed implementation of [`StateStore`].
///
/// Uses `sqlx::SqlitePool` for connection pooling. Each entry is one row
/// keyed by the canonical [`StateKey`] string.
pub struct SqliteStateStore {
    pool: SqlitePool,
    config: Arc<SqliteConfig>,
}

impl SqliteStateStore {
    /// Create a new `SqliteStateStore` from the provided configuration.
    ///
    /// Opens (creating if missing) the database, creates the connection
    /// pool, and runs migrations to ensure the state table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if pool creation fails, or
    /// [`StateError::Backend`] if migrations fail.
    pub async fn new(config: SqliteConfig) -> Result<Self, StateError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StateError::Connection(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a `SqliteStateStore` from an existing pool and config.
    ///
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Backend`] if migrations fail.
    pub async fn from_pool(pool: SqlitePool, config: SqliteConfig) -> Result<Self, StateError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn check_and_set(&self, key: &StateKey, value: &str) -> Result<bool, StateError> {
        let table = self.config.state_table();
        let query = format!(
            "INSERT INTO {table} (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO NOTHING"
        );

        let result = sqlx::query(&query)
            .bind(key.canonical())
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn get(&self, key: &StateKey) -> Result<Option<String>, StateError> {
        let table = self.config.state_table();
        let query = format!("SELECT value FROM {table} WHERE key = ?1");

        let row = sqlx::query(&query)
            .bind(key.canonical())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("value"))
            .transpose()
            .map_err(|e| StateError::Backend(e.to_string()))
    }

    async fn set(&self, key: &StateKey, value: &str) -> Result<(), StateError> {
        let table = self.config.state_table();
        let query = format!(
            "INSERT INTO {table} (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, \
             updated_at = CURRENT_TIMESTAMP"
        );

        sqlx::query(&query)
            .bind(key.canonical())
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &StateKey) -> Result<bool, StateError> {
        let table = self.config.state_table();
        let query = format!("DELETE FROM {table} WHERE key = ?1");

        let result = sqlx::query(&query)
            .bind(key.canonical())
            .execute(&self.pool)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
