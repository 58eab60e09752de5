//! # BoardStore
//!
//! Boards are created lazily and never deleted. All race handling is the
//! repository's upsert; this layer validates names and maps errors.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Board;
use crate::traits::BoardRepo;
use crate::validation::require;

#[derive(Clone)]
pub struct BoardStore {
    repo: Arc<dyn BoardRepo>,
}

impl BoardStore {
    pub fn new(repo: Arc<dyn BoardRepo>) -> Self {
        Self { repo }
    }

    /// Returns the board named `name`, creating it empty if needed.
    pub async fn get_or_create(&self, name: &str) -> Result<Board> {
        require("board", name)?;
        let board = self
            .repo
            .get_or_create_board(name)
            .await
            .map_err(|e| AppError::persistence("get_or_create_board", e))?;
        debug!(board = %board.name, threads = board.threads.len(), "board resolved");
        Ok(board)
    }

    /// References `thread_id` from the named board. Re-attaching is a no-op.
    pub async fn attach_thread(&self, board_name: &str, thread_id: Uuid) -> Result<()> {
        require("board", board_name)?;
        self.repo
            .attach_thread(board_name, thread_id)
            .await
            .map_err(|e| AppError::persistence("attach_thread", e))?;
        info!(board = board_name, %thread_id, "thread attached");
        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Board>> {
        self.repo
            .find_board(name)
            .await
            .map_err(|e| AppError::persistence("find_board", e))
    }
}
