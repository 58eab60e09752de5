//! rusty-board/crates/rb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Board:
//! boards, threads with embedded replies, and the stores that enforce their
//! consistency rules on top of pluggable repositories.

pub mod boards;
pub mod error;
pub mod message_board;
pub mod models;
pub mod password;
pub mod threads;
pub mod traits;
pub mod validation;

// Re-exporting for easier access in other crates
pub use boards::BoardStore;
pub use error::*;
pub use message_board::MessageBoard;
pub use models::*;
pub use password::PasswordScheme;
pub use threads::ThreadStore;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;

    #[test]
    fn test_thread_creation_v7() {
        let now = Utc::now();
        let thread = ThreadRecord::new("Hello Rust!".to_string(), "pw".to_string(), now);
        assert_eq!(thread.created_on, thread.bumped_on);
        assert!(!thread.reported);
        assert!(thread.replies.is_empty());
        assert_eq!(thread.id.get_version_num(), 7);
    }

    #[test]
    fn thread_documents_round_trip_through_json() {
        let mut thread = ThreadRecord::new("op".into(), "pw".into(), Utc::now());
        let created_on = thread.next_bump(Utc::now());
        thread.push_reply(ReplyRecord::new("reply".into(), "pw2".into(), created_on));

        let json = serde_json::to_string(&thread).unwrap();
        assert!(json.contains("\"_id\""));
        let back: ThreadRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, thread);
    }
}
