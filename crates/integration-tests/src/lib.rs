//! Shared fixtures for the integration test targets.

use configs::Settings;
use rb_app::Repos;
use rb_core::MessageBoard;
use rb_db_memory::MemoryRepo;
use rb_db_sqlite::SqliteRepo;
use std::path::PathBuf;
use uuid::Uuid;

/// A message board over a fresh, empty store.
pub struct Backend {
    pub name: &'static str,
    pub board: MessageBoard,
}

/// One fresh board per storage backend, assembled with default settings.
pub async fn backends() -> anyhow::Result<Vec<Backend>> {
    let settings = Settings::defaults()?;
    let sqlite = SqliteRepo::new("sqlite::memory:", 1).await?;

    Ok(vec![
        Backend {
            name: "memory",
            board: rb_app::assemble(&settings, Repos::shared(MemoryRepo::new())),
        },
        Backend {
            name: "sqlite",
            board: rb_app::assemble(&settings, Repos::shared(sqlite)),
        },
    ])
}

/// A SQLite database file under the temp dir, removed (with its WAL files)
/// on drop. Drop every pool on it first.
pub struct TempDb {
    path: PathBuf,
}

impl TempDb {
    pub fn new(prefix: &str) -> Self {
        let path = std::env::temp_dir().join(format!("{prefix}-{}.db", Uuid::now_v7()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}
