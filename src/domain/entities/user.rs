//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::OffsetPagination;

/// Represents a user account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(32) NOT NULL UNIQUE
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - name: VARCHAR(64) NULL
/// - profile_picture: TEXT NULL
/// - is_private: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Username (2-32 characters, unique)
    pub username: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name (optional, up to 64 characters)
    pub name: Option<String>,

    /// URL to the user's profile picture
    pub profile_picture: Option<String>,

    /// Whether the account's content is gated to followers
    #[serde(default)]
    pub is_private: bool,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Get the user's display name, falling back to username if not set.
    pub fn name_or_username(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }

    /// Whether `requester` may read this user's content without a
    /// follow-edge check. Private accounts still show content to
    /// themselves.
    pub fn content_visible_without_follow(&self, requester_id: i64) -> bool {
        !self.is_private || self.id == requester_id
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username: String::new(),
            email: String::new(),
            password_hash: String::new(),
            name: None,
            profile_picture: None,
            is_private: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Create a new user in the database.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Delete a user by ID, cascading to owned content.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Check if a username is already taken.
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;

    /// Toggle the private-account flag, returning the updated user.
    async fn set_private(&self, id: i64, is_private: bool) -> Result<User, AppError>;

    /// Store the profile picture URL, returning the updated user.
    async fn set_profile_picture(&self, id: i64, url: &str) -> Result<User, AppError>;

    /// Case-insensitive username substring search.
    async fn search_by_username(
        &self,
        term: &str,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError>;

    /// Accounts followed by accounts the user follows, excluding the
    /// user and anyone they already follow.
    async fn recommendations(
        &self,
        user_id: i64,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError>;
}
