//! Reaction entity and repository trait.
//!
//! Maps to the `reactions` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Reaction kind matching the database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReactionType {
    Like,
    Retweet,
}

impl ReactionType {
    /// Parse from the wire/database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "LIKE" => Some(Self::Like),
            "RETWEET" => Some(Self::Retweet),
            _ => None,
        }
    }

    /// Convert to the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::Retweet => "RETWEET",
        }
    }
}

impl std::fmt::Display for ReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user's reaction on a post.
///
/// Maps to the `reactions` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - user_id: BIGINT NOT NULL REFERENCES users(id)
/// - post_id: BIGINT NOT NULL REFERENCES posts(id)
/// - reaction_type: VARCHAR(10) NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (user_id, post_id, reaction_type)
///
/// The unique constraint ensures at most one reaction of a given type
/// per (user, post) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// User who reacted
    pub user_id: i64,

    /// Post being reacted to
    pub post_id: i64,

    /// LIKE or RETWEET
    pub reaction_type: ReactionType,

    /// When the reaction was added
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new reaction.
    pub fn new(id: i64, user_id: i64, post_id: i64, reaction_type: ReactionType) -> Self {
        Self {
            id,
            user_id,
            post_id,
            reaction_type,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Reaction data access operations.
///
/// Create/delete also maintain the matching counter on the post row,
/// inside one transaction.
#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Insert a reaction and increment the post's counter. Duplicate
    /// (user, post, type) rows are a conflict.
    async fn create(&self, reaction: &Reaction) -> Result<Reaction, AppError>;

    /// Remove the caller's reaction of the given type and decrement the
    /// counter when a row was removed; returns whether one was.
    async fn delete(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError>;

    /// Whether the user already reacted to the post with this type.
    async fn exists(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError>;
}
