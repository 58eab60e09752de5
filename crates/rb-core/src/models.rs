//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Board.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! `ThreadRecord` is the aggregate root: replies live inside it and are never
//! stored or addressed on their own. The `*View` and `ThreadSummary` types are
//! the read projections handed to the transport layer; they never carry a
//! delete password or a report flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text written over a reply by a password-verified delete.
pub const DELETED_TEXT: &str = "[deleted]";

/// A named board (e.g. "b"). Holds thread references, never thread copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub name: String,
    /// Thread identities in attach order. May point at deleted threads.
    pub threads: Vec<Uuid>,
}

impl Board {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threads: Vec::new(),
        }
    }

    /// Appends `thread_id` unless it is already referenced.
    /// Returns whether the list changed.
    pub fn attach(&mut self, thread_id: Uuid) -> bool {
        if self.threads.contains(&thread_id) {
            return false;
        }
        self.threads.push(thread_id);
        true
    }
}

/// A thread and every reply ever posted to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub delete_password: String,
    pub created_on: DateTime<Utc>,
    /// Activity marker used for board ordering
    pub bumped_on: DateTime<Utc>,
    pub reported: bool,
    /// Chronological (append) order
    pub replies: Vec<ReplyRecord>,
}

impl ThreadRecord {
    /// A fresh, unreported thread with no replies.
    pub fn new(text: String, delete_password: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            delete_password,
            created_on: now,
            bumped_on: now,
            reported: false,
            replies: Vec::new(),
        }
    }

    pub fn reply(&self, reply_id: Uuid) -> Option<&ReplyRecord> {
        self.replies.iter().find(|r| r.id == reply_id)
    }

    pub fn reply_mut(&mut self, reply_id: Uuid) -> Option<&mut ReplyRecord> {
        self.replies.iter_mut().find(|r| r.id == reply_id)
    }

    /// Timestamp for the next reply: `now`, unless that would not move
    /// `bumped_on` forward, in which case one microsecond past it.
    pub fn next_bump(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now > self.bumped_on {
            now
        } else {
            self.bumped_on + chrono::Duration::microseconds(1)
        }
    }

    /// Appends `reply` and bumps the thread to the reply's timestamp.
    pub fn push_reply(&mut self, reply: ReplyRecord) {
        self.bumped_on = reply.created_on;
        self.replies.push(reply);
    }
}

/// A reply embedded in its parent thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub delete_password: String,
    pub created_on: DateTime<Utc>,
    pub reported: bool,
}

impl ReplyRecord {
    pub fn new(text: String, delete_password: String, created_on: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text,
            delete_password,
            created_on,
            reported: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.text == DELETED_TEXT
    }
}

/// Public view of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
}

impl From<&ReplyRecord> for ReplyView {
    fn from(reply: &ReplyRecord) -> Self {
        Self {
            id: reply.id,
            text: reply.text.clone(),
            created_on: reply.created_on,
        }
    }
}

/// One entry of a board listing.
///
/// `replies` is the filtered, capped subset; `replycount` counts every reply
/// stored on the thread, reported and deleted ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
    pub replycount: usize,
}

impl ThreadSummary {
    /// Builds the listing entry, keeping at most `reply_limit` of the newest
    /// unreported replies.
    pub fn from_record(thread: &ThreadRecord, reply_limit: usize) -> Self {
        let mut visible: Vec<&ReplyRecord> =
            thread.replies.iter().filter(|r| !r.reported).collect();
        visible.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        visible.truncate(reply_limit);

        Self {
            id: thread.id,
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: visible.into_iter().map(ReplyView::from).collect(),
            replycount: thread.replies.len(),
        }
    }
}

/// A single thread with all of its replies in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub text: String,
    pub created_on: DateTime<Utc>,
    pub bumped_on: DateTime<Utc>,
    pub replies: Vec<ReplyView>,
}

impl From<&ThreadRecord> for ThreadView {
    fn from(thread: &ThreadRecord) -> Self {
        Self {
            id: thread.id,
            text: thread.text.clone(),
            created_on: thread.created_on,
            bumped_on: thread.bumped_on,
            replies: thread.replies.iter().map(ReplyView::from).collect(),
        }
    }
}

/// Caps applied by board listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLimits {
    pub threads: usize,
    pub replies: usize,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self {
            threads: 10,
            replies: 3,
        }
    }
}
