//! SQLite turn store — the embedded, file-backed backend.
//!
//! A single `turns` table keyed by `(session_key, seq)` holds every
//! conversational turn. The sequence number is assigned inside the INSERT
//! itself, so appends are atomic: a concurrent reader on the same session
//! either sees the whole turn or none of it, and sequences never have gaps.

use async_trait::async_trait;
use chrono::Utc;
use daybook_core::error::StoreError;
use daybook_core::message::SessionKey;
use daybook_core::store::{Turn, TurnStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A production SQLite turn store.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store from a connection URL.
    ///
    /// The database and table are created automatically.
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite turn store initialized at {url}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Run schema migrations — creates the turns table and its index.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                session_key    TEXT NOT NULL,
                seq            INTEGER NOT NULL,
                human_text     TEXT NOT NULL,
                assistant_text TEXT NOT NULL,
                created_at     TEXT NOT NULL,
                PRIMARY KEY (session_key, seq)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("turns table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Parse a `Turn` from a SQLite row.
    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, StoreError> {
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| StoreError::QueryFailed(format!("seq column: {e}")))?;
        let human_text: String = row
            .try_get("human_text")
            .map_err(|e| StoreError::QueryFailed(format!("human_text column: {e}")))?;
        let assistant_text: String = row
            .try_get("assistant_text")
            .map_err(|e| StoreError::QueryFailed(format!("assistant_text column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Turn {
            seq,
            human_text,
            assistant_text,
            created_at,
        })
    }
}

#[async_trait]
impl TurnStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load_history(
        &self,
        session: &SessionKey,
        limit: usize,
    ) -> Result<Vec<Turn>, StoreError> {
        // Take the most recent `limit` turns, then flip back to arrival order.
        let rows = if limit == 0 {
            sqlx::query("SELECT * FROM turns WHERE session_key = ?1 ORDER BY seq ASC")
                .bind(session.as_str())
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query(
                r#"
                SELECT * FROM (
                    SELECT * FROM turns WHERE session_key = ?1 ORDER BY seq DESC LIMIT ?2
                ) ORDER BY seq ASC
                "#,
            )
            .bind(session.as_str())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| StoreError::QueryFailed(format!("load_history: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn append_turn(
        &self,
        session: &SessionKey,
        human_text: &str,
        assistant_text: &str,
    ) -> Result<Turn, StoreError> {
        let created_at = Utc::now();

        // The sequence number is computed inside the INSERT so two appends
        // on the same session cannot race to the same seq, and readers never
        // observe a half-written turn.
        let row = sqlx::query(
            r#"
            INSERT INTO turns (session_key, seq, human_text, assistant_text, created_at)
            VALUES (
                ?1,
                COALESCE((SELECT MAX(seq) + 1 FROM turns WHERE session_key = ?1), 0),
                ?2, ?3, ?4
            )
            RETURNING seq
            "#,
        )
        .bind(session.as_str())
        .bind(human_text)
        .bind(assistant_text)
        .bind(created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT failed: {e}")))?;

        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| StoreError::QueryFailed(format!("returned seq: {e}")))?;

        debug!(session = %session, seq, "Appended turn");

        Ok(Turn {
            seq,
            human_text: human_text.into(),
            assistant_text: assistant_text.into(),
            created_at,
        })
    }

    async fn count(&self, session: &SessionKey) -> Result<usize, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM turns WHERE session_key = ?1")
            .bind(session.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }
}
