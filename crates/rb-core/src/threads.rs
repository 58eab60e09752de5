//! # ThreadStore
//!
//! Owns the thread aggregate: creation, board listings, reporting, deletion,
//! and every reply operation. Reply writes go through
//! [`ThreadRepo::update_thread`] so that an append and its bump land as one
//! write.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, DeleteOutcome, ReplyOutcome, ReportOutcome, Result};
use crate::models::{
    ListingLimits, ReplyRecord, ThreadRecord, ThreadSummary, ThreadView, DELETED_TEXT,
};
use crate::password::PasswordScheme;
use crate::traits::{BoardRepo, ThreadRepo};
use crate::validation::require_post;

#[derive(Clone)]
pub struct ThreadStore {
    threads: Arc<dyn ThreadRepo>,
    boards: Arc<dyn BoardRepo>,
    passwords: PasswordScheme,
}

impl ThreadStore {
    pub fn new(threads: Arc<dyn ThreadRepo>, boards: Arc<dyn BoardRepo>) -> Self {
        Self {
            threads,
            boards,
            passwords: PasswordScheme::default(),
        }
    }

    pub fn with_password_scheme(mut self, passwords: PasswordScheme) -> Self {
        self.passwords = passwords;
        self
    }

    /// Creates and persists a new thread. The returned record still carries
    /// its delete password; it is meant for the poster only.
    pub async fn create(&self, text: &str, delete_password: &str) -> Result<ThreadRecord> {
        require_post(text, delete_password)?;
        let sealed = self.passwords.seal(delete_password)?;
        let thread = ThreadRecord::new(text.to_string(), sealed, Utc::now());

        self.threads
            .insert_thread(&thread)
            .await
            .map_err(|e| AppError::persistence("insert_thread", e))?;

        info!(thread_id = %thread.id, "thread created");
        Ok(thread)
    }

    /// The most recently bumped threads of a board, each with its newest
    /// unreported replies.
    pub async fn list_recent(
        &self,
        board_name: &str,
        limits: ListingLimits,
    ) -> Result<Vec<ThreadSummary>> {
        let board = self
            .boards
            .find_board(board_name)
            .await
            .map_err(|e| AppError::persistence("find_board", e))?
            .ok_or_else(|| AppError::board_not_found(board_name))?;

        let threads = self
            .threads
            .get_threads(&board.threads)
            .await
            .map_err(|e| AppError::persistence("get_threads", e))?;

        let stale = board.threads.len().saturating_sub(threads.len());
        if stale > 0 {
            debug!(board = board_name, stale, "skipping deleted thread references");
        }

        Ok(summarize(threads, limits))
    }

    pub async fn get_by_id(&self, thread_id: Uuid) -> Result<Option<ThreadRecord>> {
        self.threads
            .get_thread(thread_id)
            .await
            .map_err(|e| AppError::persistence("get_thread", e))
    }

    /// Flags the thread for moderation. Reporting twice changes nothing.
    pub async fn report(&self, thread_id: Uuid) -> Result<ReportOutcome> {
        let found = self
            .threads
            .update_thread(thread_id, &mut |thread: &mut ThreadRecord| {
                if thread.reported {
                    return false;
                }
                thread.reported = true;
                true
            })
            .await
            .map_err(|e| AppError::persistence("update_thread", e))?;

        match found {
            None => Err(AppError::thread_not_found(thread_id)),
            Some(changed) => {
                info!(%thread_id, changed, "thread reported");
                Ok(ReportOutcome::Reported)
            }
        }
    }

    /// Permanently removes the thread if `supplied_password` matches.
    pub async fn delete(&self, thread_id: Uuid, supplied_password: &str) -> Result<DeleteOutcome> {
        let Some(thread) = self.get_by_id(thread_id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };

        if !self.passwords.verify(supplied_password, &thread.delete_password) {
            warn!(%thread_id, "thread delete rejected: incorrect password");
            return Ok(DeleteOutcome::WrongPassword);
        }

        let existed = self
            .threads
            .delete_thread(thread_id)
            .await
            .map_err(|e| AppError::persistence("delete_thread", e))?;

        if !existed {
            return Ok(DeleteOutcome::NotFound);
        }
        info!(%thread_id, "thread deleted");
        Ok(DeleteOutcome::Success)
    }

    /// Appends a reply and bumps the thread to the reply's timestamp.
    pub async fn add_reply(
        &self,
        thread_id: Uuid,
        text: &str,
        delete_password: &str,
    ) -> Result<ReplyRecord> {
        require_post(text, delete_password)?;
        let sealed = self.passwords.seal(delete_password)?;

        let mut added: Option<ReplyRecord> = None;
        let found = self
            .threads
            .update_thread(thread_id, &mut |thread: &mut ThreadRecord| {
                let reply = ReplyRecord::new(
                    text.to_string(),
                    sealed.clone(),
                    thread.next_bump(Utc::now()),
                );
                thread.push_reply(reply.clone());
                added = Some(reply);
                true
            })
            .await
            .map_err(|e| AppError::persistence("update_thread", e))?;

        match (found, added) {
            (Some(_), Some(reply)) => {
                info!(%thread_id, reply_id = %reply.id, "reply added");
                Ok(reply)
            }
            _ => Err(AppError::thread_not_found(thread_id)),
        }
    }

    /// The full thread with all replies, passwords and report flags stripped.
    pub async fn get_with_replies(&self, thread_id: Uuid) -> Result<ThreadView> {
        self.get_by_id(thread_id)
            .await?
            .map(|thread| ThreadView::from(&thread))
            .ok_or_else(|| AppError::thread_not_found(thread_id))
    }

    /// Flags one reply for moderation.
    pub async fn report_reply(&self, thread_id: Uuid, reply_id: Uuid) -> Result<ReportOutcome> {
        let mut outcome = ReportOutcome::ReplyNotFound;
        let found = self
            .threads
            .update_thread(thread_id, &mut |thread: &mut ThreadRecord| {
                match thread.reply_mut(reply_id) {
                    None => {
                        outcome = ReportOutcome::ReplyNotFound;
                        false
                    }
                    Some(reply) => {
                        outcome = ReportOutcome::Reported;
                        !std::mem::replace(&mut reply.reported, true)
                    }
                }
            })
            .await
            .map_err(|e| AppError::persistence("update_thread", e))?;

        if found.is_none() {
            return Ok(ReportOutcome::ThreadNotFound);
        }
        if outcome == ReportOutcome::Reported {
            info!(%thread_id, %reply_id, "reply reported");
        }
        Ok(outcome)
    }

    /// Soft-deletes a reply: only its text changes.
    pub async fn delete_reply(
        &self,
        thread_id: Uuid,
        reply_id: Uuid,
        supplied_password: &str,
    ) -> Result<ReplyOutcome> {
        let Some(thread) = self.get_by_id(thread_id).await? else {
            return Ok(ReplyOutcome::ThreadNotFound);
        };
        let Some(reply) = thread.reply(reply_id) else {
            return Ok(ReplyOutcome::ReplyNotFound);
        };

        // Passwords never change once stored, so checking outside the write
        // cannot race with it.
        if !self.passwords.verify(supplied_password, &reply.delete_password) {
            warn!(%thread_id, %reply_id, "reply delete rejected: incorrect password");
            return Ok(ReplyOutcome::WrongPassword);
        }

        let mut outcome = ReplyOutcome::ReplyNotFound;
        let found = self
            .threads
            .update_thread(thread_id, &mut |thread: &mut ThreadRecord| {
                match thread.reply_mut(reply_id) {
                    None => false,
                    Some(reply) => {
                        outcome = ReplyOutcome::Success;
                        if reply.is_deleted() {
                            return false;
                        }
                        reply.text = DELETED_TEXT.to_string();
                        true
                    }
                }
            })
            .await
            .map_err(|e| AppError::persistence("update_thread", e))?;

        if found.is_none() {
            return Ok(ReplyOutcome::ThreadNotFound);
        }
        if outcome == ReplyOutcome::Success {
            info!(%thread_id, %reply_id, "reply deleted");
        }
        Ok(outcome)
    }
}

/// Orders threads by `bumped_on` (newest first), keeps `limits.threads` of
/// them and projects each to its listing entry.
pub fn summarize(mut threads: Vec<ThreadRecord>, limits: ListingLimits) -> Vec<ThreadSummary> {
    threads.sort_by(|a, b| b.bumped_on.cmp(&a.bumped_on).then_with(|| b.id.cmp(&a.id)));
    threads.truncate(limits.threads);
    threads
        .iter()
        .map(|thread| ThreadSummary::from_record(thread, limits.replies))
        .collect()
}
