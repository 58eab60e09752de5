//! # rb-db-memory
//!
//! In-process implementation of `BoardRepo` and `ThreadRepo` on top of
//! `DashMap`. Every mutation runs while holding the entry's shard write lock,
//! which gives the per-thread serialization and the board get-or-create
//! uniqueness the ports require. No guard is ever held across an `.await`.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rb_core::models::{Board, ThreadRecord};
use rb_core::traits::{BoardRepo, ThreadMutator, ThreadRepo};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryRepo {
    boards: DashMap<String, Board>,
    threads: DashMap<Uuid, ThreadRecord>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }
}

#[async_trait]
impl BoardRepo for MemoryRepo {
    async fn get_or_create_board(&self, name: &str) -> anyhow::Result<Board> {
        let board = self
            .boards
            .entry(name.to_string())
            .or_insert_with(|| Board::new(name))
            .value()
            .clone();
        Ok(board)
    }

    async fn find_board(&self, name: &str) -> anyhow::Result<Option<Board>> {
        Ok(self.boards.get(name).map(|b| b.value().clone()))
    }

    async fn attach_thread(&self, name: &str, thread_id: Uuid) -> anyhow::Result<()> {
        let mut board = self
            .boards
            .entry(name.to_string())
            .or_insert_with(|| Board::new(name));
        if !board.attach(thread_id) {
            debug!(board = name, %thread_id, "thread already attached");
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadRepo for MemoryRepo {
    async fn insert_thread(&self, thread: &ThreadRecord) -> anyhow::Result<()> {
        match self.threads.entry(thread.id) {
            Entry::Occupied(_) => anyhow::bail!("thread {} already exists", thread.id),
            Entry::Vacant(slot) => {
                slot.insert(thread.clone());
                Ok(())
            }
        }
    }

    async fn get_thread(&self, id: Uuid) -> anyhow::Result<Option<ThreadRecord>> {
        Ok(self.threads.get(&id).map(|t| t.value().clone()))
    }

    async fn get_threads(&self, ids: &[Uuid]) -> anyhow::Result<Vec<ThreadRecord>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.threads.get(id).map(|t| t.value().clone()))
            .collect())
    }

    async fn update_thread(
        &self,
        id: Uuid,
        apply: ThreadMutator<'_>,
    ) -> anyhow::Result<Option<bool>> {
        Ok(self
            .threads
            .get_mut(&id)
            .map(|mut thread| apply(thread.value_mut())))
    }

    async fn delete_thread(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.threads.remove(&id).is_some())
    }
}
