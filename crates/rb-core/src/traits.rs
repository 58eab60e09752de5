//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to back the stores.
//!
//! Atomicity lives here, not in the stores: `get_or_create_board` and
//! `attach_thread` are upserts, and `update_thread` is a serialized
//! read-modify-write of one thread document.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Board, ThreadRecord};

/// Mutation applied to a thread inside [`ThreadRepo::update_thread`].
///
/// Returns `true` when it changed the record and the change must be written.
/// A mutator returning `false` must leave the record untouched. It may run
/// more than once if the backend retries on a write conflict.
pub type ThreadMutator<'a> = &'a mut (dyn FnMut(&mut ThreadRecord) -> bool + Send);

/// Persistence contract for boards.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardRepo: Send + Sync {
    /// Returns the board named `name`, creating an empty one if absent.
    /// Concurrent calls for one name must never create two boards.
    async fn get_or_create_board(&self, name: &str) -> anyhow::Result<Board>;

    async fn find_board(&self, name: &str) -> anyhow::Result<Option<Board>>;

    /// Appends `thread_id` to the board's references, creating the board if
    /// absent. Already-referenced identities are left where they are.
    async fn attach_thread(&self, name: &str, thread_id: Uuid) -> anyhow::Result<()>;
}

/// Persistence contract for thread documents (replies embedded).
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn insert_thread(&self, thread: &ThreadRecord) -> anyhow::Result<()>;

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<ThreadRecord>>;

    /// Fetches every listed thread that still exists. Missing ids are skipped.
    async fn get_threads(&self, ids: &[Uuid]) -> anyhow::Result<Vec<ThreadRecord>>;

    /// Runs `apply` against the stored thread with no concurrent writer
    /// interleaving. `None` if the thread does not exist, otherwise whether
    /// the mutator reported a change.
    async fn update_thread(
        &self,
        id: Uuid,
        apply: ThreadMutator<'_>,
    ) -> anyhow::Result<Option<bool>>;

    /// Removes the thread permanently. Returns whether it existed.
    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool>;
}
