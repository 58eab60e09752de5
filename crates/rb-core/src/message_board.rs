//! # MessageBoard
//!
//! Coordinates the two stores for the one operation that spans both
//! aggregates: posting a thread to a board.

use tracing::{error, info};

use crate::boards::BoardStore;
use crate::error::Result;
use crate::models::{ListingLimits, ThreadRecord, ThreadSummary};
use crate::threads::ThreadStore;
use crate::validation::require;

#[derive(Clone)]
pub struct MessageBoard {
    boards: BoardStore,
    threads: ThreadStore,
    limits: ListingLimits,
}

impl MessageBoard {
    pub fn new(boards: BoardStore, threads: ThreadStore) -> Self {
        Self {
            boards,
            threads,
            limits: ListingLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ListingLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn boards(&self) -> &BoardStore {
        &self.boards
    }

    pub fn threads(&self) -> &ThreadStore {
        &self.threads
    }

    pub fn limits(&self) -> ListingLimits {
        self.limits
    }

    /// Creates a thread and references it from `board_name`, creating the
    /// board on first use.
    pub async fn post_thread(
        &self,
        board_name: &str,
        text: &str,
        delete_password: &str,
    ) -> Result<ThreadRecord> {
        require("board", board_name)?;
        let thread = self.threads.create(text, delete_password).await?;

        if let Err(err) = self.boards.attach_thread(board_name, thread.id).await {
            // An unattached thread is unreachable from any listing; drop it.
            if let Err(cleanup) = self.threads.delete(thread.id, delete_password).await {
                error!(thread_id = %thread.id, error = %cleanup, "orphaned thread cleanup failed");
            }
            return Err(err);
        }

        info!(board = board_name, thread_id = %thread.id, "thread posted");
        Ok(thread)
    }

    /// Board listing with the configured limits.
    pub async fn list(&self, board_name: &str) -> Result<Vec<ThreadSummary>> {
        self.threads.list_recent(board_name, self.limits).await
    }
}
