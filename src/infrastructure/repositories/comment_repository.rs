//! Comment Repository Implementation
//!
//! PostgreSQL implementation of comment operations. Comments live in the
//! posts table with is_comment = TRUE and a parent_id; creating or
//! deleting one adjusts the parent's qty_comments in the same
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{CommentRepository, Post};
use crate::shared::error::AppError;
use crate::shared::pagination::{Cursor, CursorPagination};

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    author_id: i64,
    content: String,
    images: Vec<String>,
    is_comment: bool,
    parent_id: Option<i64>,
    qty_likes: i32,
    qty_retweets: i32,
    qty_comments: i32,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            author_id: self.author_id,
            content: self.content,
            images: self.images,
            is_comment: self.is_comment,
            parent_id: self.parent_id,
            qty_likes: self.qty_likes,
            qty_retweets: self.qty_retweets,
            qty_comments: self.qty_comments,
            created_at: self.created_at,
        }
    }
}

/// Position of a cursor row in the engagement ordering
/// (qty_likes DESC, qty_retweets DESC, id ASC).
#[derive(Debug, sqlx::FromRow)]
struct EngagementPosition {
    qty_likes: i32,
    qty_retweets: i32,
    id: i64,
}

/// Position of a cursor row in the (created_at DESC, id ASC) ordering.
#[derive(Debug, sqlx::FromRow)]
struct TimePosition {
    created_at: DateTime<Utc>,
    id: i64,
}

/// PostgreSQL comment repository implementation.
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Creates a new PgCommentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a cursor ID to its engagement position under the given
    /// parent. A cursor outside this comment thread is reported as
    /// not-found rather than silently producing a wrong page.
    async fn engagement_position(
        &self,
        cursor_id: i64,
        parent_id: i64,
    ) -> Result<EngagementPosition, AppError> {
        sqlx::query_as::<_, EngagementPosition>(
            "SELECT qty_likes, qty_retweets, id FROM posts WHERE id = $1 AND parent_id = $2",
        )
        .bind(cursor_id)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
    }

    async fn time_position(&self, cursor_id: i64) -> Result<TimePosition, AppError> {
        sqlx::query_as::<_, TimePosition>(
            "SELECT created_at, id FROM posts WHERE id = $1 AND is_comment = TRUE",
        )
        .bind(cursor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    /// Find a comment by ID. Top-level posts are not returned here.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, author_id, content, images, is_comment, parent_id,
                   qty_likes, qty_retweets, qty_comments, created_at
            FROM posts
            WHERE id = $1 AND is_comment = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_post()))
    }

    /// Insert a comment and increment the parent's comment counter in
    /// one transaction.
    async fn create(&self, comment: &Post) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO posts (id, author_id, content, images, is_comment, parent_id)
            VALUES ($1, $2, $3, $4, TRUE, $5)
            RETURNING id, author_id, content, images, is_comment, parent_id,
                      qty_likes, qty_retweets, qty_comments, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(&comment.images)
        .bind(comment.parent_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET qty_comments = qty_comments + 1 WHERE id = $1")
            .bind(comment.parent_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into_post())
    }

    /// Delete a comment and decrement the parent's comment counter in
    /// one transaction.
    async fn delete(&self, comment_id: i64, parent_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND is_comment = TRUE")
            .bind(comment_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Comment with id {} not found",
                comment_id
            )));
        }

        sqlx::query("UPDATE posts SET qty_comments = qty_comments - 1 WHERE id = $1")
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Comments under a post, most-engaged first.
    ///
    /// Ordering is (qty_likes DESC, qty_retweets DESC, id ASC) so a page
    /// boundary stays stable between ties.
    async fn by_post(
        &self,
        post_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE parent_id = $1
                    ORDER BY qty_likes DESC, qty_retweets DESC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(post_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::After(cursor_id)) => {
                let pos = self.engagement_position(cursor_id, post_id).await?;
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE parent_id = $1
                        AND (qty_likes < $3
                            OR (qty_likes = $3 AND qty_retweets < $4)
                            OR (qty_likes = $3 AND qty_retweets = $4 AND id > $5))
                    ORDER BY qty_likes DESC, qty_retweets DESC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(post_id)
                .bind(limit)
                .bind(pos.qty_likes)
                .bind(pos.qty_retweets)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::Before(cursor_id)) => {
                let pos = self.engagement_position(cursor_id, post_id).await?;
                let mut rows = sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE parent_id = $1
                        AND (qty_likes > $3
                            OR (qty_likes = $3 AND qty_retweets > $4)
                            OR (qty_likes = $3 AND qty_retweets = $4 AND id < $5))
                    ORDER BY qty_likes ASC, qty_retweets ASC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(post_id)
                .bind(limit)
                .bind(pos.qty_likes)
                .bind(pos.qty_retweets)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?;
                rows.reverse();
                rows
            }
        };

        Ok(rows.into_iter().map(|r| r.into_post()).collect())
    }

    /// An author's comments, latest first. Author visibility is resolved
    /// by the caller.
    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = TRUE
                    ORDER BY created_at DESC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(author_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::After(cursor_id)) => {
                let pos = self.time_position(cursor_id).await?;
                sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = TRUE
                        AND (created_at < $3 OR (created_at = $3 AND id > $4))
                    ORDER BY created_at DESC, id ASC
                    LIMIT $2
                    "#,
                )
                .bind(author_id)
                .bind(limit)
                .bind(pos.created_at)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::Before(cursor_id)) => {
                let pos = self.time_position(cursor_id).await?;
                let mut rows = sqlx::query_as::<_, CommentRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = TRUE
                        AND (created_at > $3 OR (created_at = $3 AND id < $4))
                    ORDER BY created_at ASC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(author_id)
                .bind(limit)
                .bind(pos.created_at)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?;
                rows.reverse();
                rows
            }
        };

        Ok(rows.into_iter().map(|r| r.into_post()).collect())
    }
}
