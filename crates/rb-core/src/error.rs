//! # AppError
//!
//! Centralized error handling for the Rusty-Board core.
//!
//! Only genuine failures live in `AppError`. The expected negative answers of
//! the report and password-gated paths (wrong password, missing thread or
//! reply) are ordinary values of [`DeleteOutcome`], [`ReportOutcome`] and
//! [`ReplyOutcome`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The primary error type for all rb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Board, Thread)
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Missing or empty required input, rejected before any mutation
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The repository failed (e.g., DB down, write rejected)
    #[error("persistence failure: {0}")]
    Persistence(#[source] anyhow::Error),

    /// Failure inside the core itself (e.g., password hashing)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn thread_not_found(id: impl ToString) -> Self {
        Self::NotFound("thread", id.to_string())
    }

    pub fn board_not_found(name: impl ToString) -> Self {
        Self::NotFound("board", name.to_string())
    }

    /// Wraps a repository error, logging it once at the boundary.
    pub(crate) fn persistence(op: &'static str, err: anyhow::Error) -> Self {
        tracing::error!(op, error = %err, "repository call failed");
        Self::Persistence(err)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }
}

/// A specialized Result type for Rusty-Board logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result of a password-gated thread delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Success,
    WrongPassword,
    NotFound,
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::WrongPassword => "incorrect password",
            Self::NotFound => "Thread not found",
        })
    }
}

/// Result of reporting a thread or a reply.
///
/// A thread report that misses is an `AppError::NotFound`, so only
/// `report_reply` yields the two miss variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    Reported,
    ThreadNotFound,
    ReplyNotFound,
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reported => "reported",
            Self::ThreadNotFound => "Thread not found",
            Self::ReplyNotFound => "Reply not found",
        })
    }
}

/// Result of a password-gated reply delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    Success,
    WrongPassword,
    ThreadNotFound,
    ReplyNotFound,
}

impl fmt::Display for ReplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::WrongPassword => "incorrect password",
            Self::ThreadNotFound => "Thread not found",
            Self::ReplyNotFound => "Reply not found",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_render_user_facing_texts() {
        assert_eq!(DeleteOutcome::Success.to_string(), "success");
        assert_eq!(ReplyOutcome::Success.to_string(), "success");
        assert_eq!(ReportOutcome::Reported.to_string(), "reported");
        assert_eq!(ReportOutcome::ReplyNotFound.to_string(), "Reply not found");
        assert_eq!(
            serde_json::to_value(ReportOutcome::ThreadNotFound).unwrap(),
            "thread_not_found"
        );
    }
}
