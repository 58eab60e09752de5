//! # rb-app
//!
//! Assembles a [`MessageBoard`] from [`Settings`]. Which storage backends
//! can be selected is decided at compile time by the `db-*` features; the
//! transport layer embeds the result.

pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use configs::{PasswordHashing, Settings, StorageBackend};
use rb_core::traits::{BoardRepo, ThreadRepo};
use rb_core::{BoardStore, ListingLimits, MessageBoard, PasswordScheme, ThreadStore};
#[cfg(feature = "db-sqlite")]
use secrecy::ExposeSecret;
use tracing::info;

// Feature-gated imports: the binary only links the storage it was built with
#[cfg(feature = "db-memory")]
use rb_db_memory::MemoryRepo;

#[cfg(feature = "db-sqlite")]
use rb_db_sqlite::SqliteRepo;

/// Both repository ports backed by one storage implementation.
pub struct Repos {
    pub boards: Arc<dyn BoardRepo>,
    pub threads: Arc<dyn ThreadRepo>,
}

impl Repos {
    pub fn shared<R>(repo: R) -> Self
    where
        R: BoardRepo + ThreadRepo + 'static,
    {
        let repo = Arc::new(repo);
        Self {
            boards: repo.clone(),
            threads: repo,
        }
    }
}

/// Opens the configured storage backend.
pub async fn connect(settings: &Settings) -> anyhow::Result<Repos> {
    match settings.storage.backend {
        #[cfg(feature = "db-memory")]
        StorageBackend::Memory => Ok(Repos::shared(MemoryRepo::new())),

        #[cfg(feature = "db-sqlite")]
        StorageBackend::Sqlite => {
            let repo = SqliteRepo::new(
                settings.storage.database_url.expose_secret(),
                settings.storage.max_connections,
            )
            .await
            .context("failed to open sqlite storage")?;
            Ok(Repos::shared(repo))
        }

        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend {other:?} is not compiled into this build"),
    }
}

/// Wires the stores over `repos` with the configured limits and password scheme.
pub fn assemble(settings: &Settings, repos: Repos) -> MessageBoard {
    let passwords = match settings.passwords.scheme {
        PasswordHashing::Plain => PasswordScheme::Plain,
        PasswordHashing::Argon2 => PasswordScheme::Argon2,
    };
    let limits = ListingLimits {
        threads: settings.listing.thread_limit,
        replies: settings.listing.reply_limit,
    };

    let boards = BoardStore::new(repos.boards.clone());
    let threads = ThreadStore::new(repos.threads, repos.boards).with_password_scheme(passwords);
    MessageBoard::new(boards, threads).with_limits(limits)
}

/// `connect` + `assemble`.
pub async fn build(settings: &Settings) -> anyhow::Result<MessageBoard> {
    let repos = connect(settings).await?;
    let board = assemble(settings, repos);
    info!(
        backend = ?settings.storage.backend,
        passwords = ?settings.passwords.scheme,
        thread_limit = settings.listing.thread_limit,
        reply_limit = settings.listing.reply_limit,
        "message board ready"
    );
    Ok(board)
}
