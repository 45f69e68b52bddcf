use sqlx::SqlitePool;

use crate::config::SqliteConfig;

/// Run database migrations, creating the state table if it does not exist.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if the DDL statement fails.
pub async fn run_migrations(pool: &SqlitePool, config: &SqliteConfig) -> Result<(), sqlx::Error> {
    let state_table = config.state_table();

    let create_state = format!(
        "CREATE TABLE IF NOT EXISTS {state_table} (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )"
    );
    sqlx::query(&create_state).execute(pool).await?;

    tracing::debug!(table = %state_table, "sqlite migrations applied");
    Ok(())
}
