//! Follow Repository Implementation
//!
//! PostgreSQL implementation of the follow graph. The unique
//! (follower_id, followed_id) index backs duplicate detection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Follow, FollowRepository, User};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct FollowRow {
    id: i64,
    follower_id: i64,
    followed_id: i64,
    created_at: DateTime<Utc>,
}

impl FollowRow {
    fn into_follow(self) -> Follow {
        Follow {
            id: self.id,
            follower_id: self.follower_id,
            followed_id: self.followed_id,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    name: Option<String>,
    profile_picture: Option<String>,
    is_private: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            profile_picture: self.profile_picture,
            is_private: self.is_private,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL follow repository implementation.
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    /// Creates a new PgFollowRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PgFollowRepository {
    /// Insert a follower edge. A duplicate pair maps to a conflict via
    /// the unique index.
    async fn create(&self, follow: &Follow) -> Result<Follow, AppError> {
        let row = sqlx::query_as::<_, FollowRow>(
            r#"
            INSERT INTO follows (id, follower_id, followed_id)
            VALUES ($1, $2, $3)
            RETURNING id, follower_id, followed_id, created_at
            "#,
        )
        .bind(follow.id)
        .bind(follow.follower_id)
        .bind(follow.followed_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Already following this user".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_follow())
    }

    /// Remove the edge; reports whether a row existed.
    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Both directed edges must exist for the pair to be mutual.
    async fn is_mutual(&self, user_a: i64, user_b: i64) -> Result<bool, AppError> {
        let mutual = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)
               AND EXISTS(SELECT 1 FROM follows WHERE follower_id = $2 AND followed_id = $1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(mutual)
    }

    /// Users following `user_id`, most recent edge first.
    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.name, u.profile_picture,
                   u.is_private, u.created_at, u.updated_at
            FROM users u
            JOIN follows f ON f.follower_id = u.id
            WHERE f.followed_id = $1
            ORDER BY f.created_at DESC, u.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    /// Users `user_id` follows, most recent edge first.
    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.name, u.profile_picture,
                   u.is_private, u.created_at, u.updated_at
            FROM users u
            JOIN follows f ON f.followed_id = u.id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC, u.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }

    /// Users connected to `user_id` by edges in both directions.
    async fn mutuals_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.name, u.profile_picture,
                   u.is_private, u.created_at, u.updated_at
            FROM users u
            JOIN follows f1 ON f1.followed_id = u.id AND f1.follower_id = $1
            JOIN follows f2 ON f2.follower_id = u.id AND f2.followed_id = $1
            ORDER BY u.username ASC, u.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_user()).collect())
    }
}
