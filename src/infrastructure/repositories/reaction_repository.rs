//! Reaction Repository Implementation
//!
//! PostgreSQL implementation of reaction operations. Adding or removing
//! a reaction adjusts the matching denormalized counter on the post row
//! inside the same transaction, so the counter never drifts from the
//! rows it summarizes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Reaction, ReactionRepository, ReactionType};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ReactionRow {
    id: i64,
    user_id: i64,
    post_id: i64,
    reaction_type: String,
    created_at: DateTime<Utc>,
}

impl ReactionRow {
    /// Converts database row to domain Reaction entity. The CHECK
    /// constraint on reactions.reaction_type keeps the stored value in
    /// the parseable set.
    fn into_reaction(self) -> Result<Reaction, AppError> {
        let reaction_type = ReactionType::parse(&self.reaction_type).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown reaction type in database: {}",
                self.reaction_type
            ))
        })?;

        Ok(Reaction {
            id: self.id,
            user_id: self.user_id,
            post_id: self.post_id,
            reaction_type,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL reaction repository implementation.
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Creates a new PgReactionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    /// Insert a reaction and increment the post's counter atomically.
    /// A duplicate (user, post, type) row maps to a conflict via the
    /// unique index.
    async fn create(&self, reaction: &Reaction) -> Result<Reaction, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ReactionRow>(
            r#"
            INSERT INTO reactions (id, user_id, post_id, reaction_type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, post_id, reaction_type, created_at
            "#,
        )
        .bind(reaction.id)
        .bind(reaction.user_id)
        .bind(reaction.post_id)
        .bind(reaction.reaction_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Reaction already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

        match reaction.reaction_type {
            ReactionType::Like => {
                sqlx::query("UPDATE posts SET qty_likes = qty_likes + 1 WHERE id = $1")
                    .bind(reaction.post_id)
                    .execute(&mut *tx)
                    .await?;
            }
            ReactionType::Retweet => {
                sqlx::query("UPDATE posts SET qty_retweets = qty_retweets + 1 WHERE id = $1")
                    .bind(reaction.post_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        row.into_reaction()
    }

    /// Remove the caller's reaction of the given type. The counter is
    /// decremented only when a row was actually removed, so removing a
    /// reaction that never existed leaves the post untouched.
    async fn delete(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "DELETE FROM reactions WHERE user_id = $1 AND post_id = $2 AND reaction_type = $3",
        )
        .bind(user_id)
        .bind(post_id)
        .bind(reaction_type.as_str())
        .execute(&mut *tx)
        .await?;

        let removed = result.rows_affected() > 0;

        if removed {
            match reaction_type {
                ReactionType::Like => {
                    sqlx::query("UPDATE posts SET qty_likes = qty_likes - 1 WHERE id = $1")
                        .bind(post_id)
                        .execute(&mut *tx)
                        .await?;
                }
                ReactionType::Retweet => {
                    sqlx::query("UPDATE posts SET qty_retweets = qty_retweets - 1 WHERE id = $1")
                        .bind(post_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;

        Ok(removed)
    }

    /// Check whether the user already reacted with this type.
    async fn exists(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reactions
                WHERE user_id = $1 AND post_id = $2 AND reaction_type = $3
            )
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .bind(reaction_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
