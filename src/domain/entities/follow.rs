//! Follow entity and repository trait.
//!
//! A follow is a directed edge in the social graph. The edge doubles as
//! the authorization primitive: it gates private-profile content, feed
//! composition, and messaging eligibility.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;
use crate::shared::error::AppError;

/// Directed follower edge.
///
/// Maps to the `follows` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - follower_id: BIGINT NOT NULL REFERENCES users(id)
/// - followed_id: BIGINT NOT NULL REFERENCES users(id)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - UNIQUE (follower_id, followed_id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// The user doing the following
    pub follower_id: i64,

    /// The user being followed
    pub followed_id: i64,

    /// Edge creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Follow {
    /// Build a new edge from `follower_id` to `followed_id`.
    pub fn new(id: i64, follower_id: i64, followed_id: i64) -> Self {
        Self {
            id,
            follower_id,
            followed_id,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for the follow graph.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert an edge. Duplicate pairs are a conflict.
    async fn create(&self, follow: &Follow) -> Result<Follow, AppError>;

    /// Remove the edge if present; returns whether a row was removed.
    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Whether `follower_id` follows `followed_id`.
    async fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError>;

    /// Whether both directed edges exist between the pair.
    async fn is_mutual(&self, user_a: i64, user_b: i64) -> Result<bool, AppError>;

    /// Users following `user_id`.
    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Users `user_id` follows.
    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Users who both follow `user_id` and are followed by `user_id`.
    async fn mutuals_of(&self, user_id: i64) -> Result<Vec<User>, AppError>;
}
