//! Durable key-value store backed by SQLite.
//!
//! A small table of advisory string values. The pool is capped at one
//! connection so each key keeps a single writer.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::Result;

const SCHEMA: &str =
    "CREATE TABLE IF NOT EXISTS kv_store (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the store at `path`.
    pub async fn connect(path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::with_options(SqlitePoolOptions::new().max_connections(1), options).await
    }

    /// In-memory store, used by tests.
    ///
    /// Tests run under tokio's paused clock, which auto-advances past the
    /// pool's default acquire timeout while the SQLite worker thread is still
    /// responding in real time; an effectively unbounded timeout (beyond the
    /// timer wheel's horizon) keeps the deadline out of the paused clock's
    /// view.
    pub async fn in_memory() -> Result<Self> {
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(86_400 * 365 * 100));
        Self::with_options(pool_options, SqliteConnectOptions::new().in_memory(true)).await
    }

    async fn with_options(
        pool_options: SqlitePoolOptions,
        options: SqliteConnectOptions,
    ) -> Result<Self> {
        let pool = pool_options.connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
