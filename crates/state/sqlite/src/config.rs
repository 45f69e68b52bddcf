/// Configuration for the `SQLite` state store backend.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database URL (e.g. `sqlite://darkroom.db` or `sqlite::memory:`).
    pub url: String,

    /// Maximum number of connections in the `sqlx` connection pool.
    ///
    /// In-memory databases are private to one connection, so use `1` there.
    pub pool_size: u32,

    /// Prefix applied to table names to avoid collisions (e.g. `"darkroom_"`).
    pub table_prefix: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: String::from("sqlite://darkroom.db"),
            pool_size: 4,
            table_prefix: String::from("darkroom_"),
        }
    }
}

impl SqliteConfig {
    /// Configuration for a throwaway in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: String::from("sqlite::memory:"),
            pool_size: 1,
            ..Self::default()
        }
    }

    /// Return the state table name (`prefix_state`).
    pub(crate) fn state_table(&self) -> String {
        format!("{}state", self.table_prefix)
    }
}
