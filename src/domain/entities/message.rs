//! Direct message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema. There is no
//! conversation entity: a conversation is the symmetric set of rows
//! between two users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;

/// Maximum message content length in characters
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Represents a direct message between two users.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - from_id: BIGINT NOT NULL REFERENCES users(id)
/// - to_id: BIGINT NOT NULL REFERENCES users(id)
/// - content: VARCHAR(1000) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Sender
    pub from_id: i64,

    /// Recipient
    pub to_id: i64,

    /// Message body, at most [`MAX_MESSAGE_LENGTH`] characters
    pub content: String,

    /// When the message was sent
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message.
    pub fn new(id: i64, from_id: i64, to_id: i64, content: String) -> Self {
        Self {
            id,
            from_id,
            to_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Whether `user_id` is one of the two participants.
    pub fn involves(&self, user_id: i64) -> bool {
        self.from_id == user_id || self.to_id == user_id
    }
}

/// Repository trait for direct message access.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a message.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// Both directions of the (user_a, user_b) pair, latest first,
    /// cursor-paginated.
    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
        page: CursorPagination,
    ) -> Result<Vec<Message>, AppError>;

    /// Distinct conversation partners of `user_id`, ordered by most
    /// recent message.
    async fn conversation_partners(&self, user_id: i64) -> Result<Vec<User>, AppError>;
}
