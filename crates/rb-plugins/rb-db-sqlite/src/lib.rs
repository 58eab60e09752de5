//! # rb-db-sqlite Implementation
//!
//! This module maps the `rb-core` aggregates onto SQLite.
//!
//! Threads are stored as whole JSON documents (replies embedded) next to a
//! `version` counter. A thread update reads and rewrites its document inside
//! a `BEGIN IMMEDIATE` transaction, so SQLite's writer lock serializes
//! concurrent writers instead of letting them race. Boards are
//! keyed by name; their thread references live in `board_threads`, ordered by
//! insertion and unique per board.

use async_trait::async_trait;
use rb_core::models::{Board, ThreadRecord};
use rb_core::traits::{BoardRepo, ThreadMutator, ThreadRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// How long a writer waits for SQLite's write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS boards (
        name TEXT PRIMARY KEY NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS board_threads (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        board_name TEXT NOT NULL REFERENCES boards(name),
        thread_id TEXT NOT NULL,
        UNIQUE (board_name, thread_id)
    )",
    "CREATE TABLE IF NOT EXISTS threads (
        id TEXT PRIMARY KEY NOT NULL,
        document TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 0
    )",
];

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Connects to `url` (e.g. `sqlite:rusty_board.db` or `sqlite::memory:`)
    /// and creates the schema if missing.
    ///
    /// In-memory databases exist per connection, so they get a pool of one.
    pub async fn new(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }
        let max_connections = if in_memory { 1 } else { max_connections.max(1) };
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            // Recycling the only connection would drop the database with it.
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        let repo = Self { pool };
        repo.migrate().await?;
        info!(max_connections, "sqlite repository ready");
        Ok(repo)
    }

    pub async fn board_count(&self) -> anyhow::Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS boards FROM boards")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("boards"))
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn board_threads(&self, name: &str) -> anyhow::Result<Vec<Uuid>> {
        let rows = sqlx::query(
            "SELECT thread_id FROM board_threads WHERE board_name = ? ORDER BY seq ASC",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Uuid::parse_str(row.get::<&str, _>("thread_id")).map_err(anyhow::Error::from))
            .collect()
    }
}

fn decode_thread(document: &str) -> anyhow::Result<ThreadRecord> {
    Ok(serde_json::from_str(document)?)
}

#[async_trait]
impl BoardRepo for SqliteRepo {
    /// Upsert by primary key; concurrent callers converge on one row.
    async fn get_or_create_board(&self, name: &str) -> anyhow::Result<Board> {
        sqlx::query("INSERT INTO boards (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Board {
            name: name.to_string(),
            threads: self.board_threads(name).await?,
        })
    }

    async fn find_board(&self, name: &str) -> anyhow::Result<Option<Board>> {
        let row = sqlx::query("SELECT name FROM boards WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        if row.is_none() {
            return Ok(None);
        }
        Ok(Some(Board {
            name: name.to_string(),
            threads: self.board_threads(name).await?,
        }))
    }

    async fn attach_thread(&self, name: &str, thread_id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO boards (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO board_threads (board_name, thread_id) VALUES (?, ?)
             ON CONFLICT(board_name, thread_id) DO NOTHING",
        )
        .bind(name)
        .bind(thread_id.to_string())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        if inserted == 0 {
            debug!(board = name, %thread_id, "thread already attached");
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadRepo for SqliteRepo {
    async fn insert_thread(&self, thread: &ThreadRecord) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO threads (id, document, version) VALUES (?, ?, 0)")
            .bind(thread.id.to_string())
            .bind(serde_json::to_string(thread)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<ThreadRecord>> {
        let row = sqlx::query("SELECT document FROM threads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| decode_thread(row.get::<&str, _>("document")))
            .transpose()
    }

    /// One query for the whole id list; ids without a row are skipped.
    async fn get_threads(&self, ids: &[Uuid]) -> anyhow::Result<Vec<ThreadRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted = serde_json::to_string(ids)?;
        let rows = sqlx::query(
            "SELECT document FROM threads WHERE id IN (SELECT value FROM json_each(?))",
        )
        .bind(wanted)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| decode_thread(row.get::<&str, _>("document")))
            .collect()
    }

    /// Read-modify-write under the database write lock. `BEGIN IMMEDIATE`
    /// takes the lock before the read, so no other writer can slip in between.
    async fn update_thread(
        &self,
        id: Uuid,
        apply: ThreadMutator<'_>,
    ) -> anyhow::Result<Option<bool>> {
        let key = id.to_string();
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let Some(row) = sqlx::query("SELECT document FROM threads WHERE id = ?")
            .bind(key.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut thread = decode_thread(row.get::<&str, _>("document"))?;
        if !apply(&mut thread) {
            return Ok(Some(false));
        }

        sqlx::query("UPDATE threads SET document = ?, version = version + 1 WHERE id = ?")
            .bind(serde_json::to_string(&thread)?)
            .bind(key.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(thread_id = %id, "thread document rewritten");
        Ok(Some(true))
    }

    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}
