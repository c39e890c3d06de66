//! Post Repository Implementation
//!
//! PostgreSQL implementation of top-level post operations with
//! visibility-aware feed queries and keyset pagination.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Post, PostRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{Cursor, CursorPagination};

/// Internal row type for post queries.
/// Maps to the posts table schema defined in the migration.
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
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

impl PostRow {
    /// Converts database row to domain Post entity.
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

/// Position of a cursor row in the (created_at DESC, id ASC) ordering.
#[derive(Debug, sqlx::FromRow)]
struct CursorPosition {
    created_at: DateTime<Utc>,
    id: i64,
}

/// PostgreSQL post repository implementation.
///
/// Feed queries join the author row and push the privacy predicate into
/// SQL: a post is visible when its author is public, is the requester,
/// or is followed by the requester.
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Creates a new PgPostRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a cursor ID to its sort position, or fail with not-found
    /// so an unknown cursor is distinguishable from an empty page.
    async fn cursor_position(&self, cursor_id: i64) -> Result<CursorPosition, AppError> {
        sqlx::query_as::<_, CursorPosition>(
            "SELECT created_at, id FROM posts WHERE id = $1",
        )
        .bind(cursor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    /// Find a post or comment row by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, author_id, content, images, is_comment, parent_id,
                   qty_likes, qty_retweets, qty_comments, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_post()))
    }

    /// Insert a new top-level post.
    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, author_id, content, images, is_comment, parent_id)
            VALUES ($1, $2, $3, $4, FALSE, NULL)
            RETURNING id, author_id, content, images, is_comment, parent_id,
                      qty_likes, qty_retweets, qty_comments, created_at
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.content)
        .bind(&post.images)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_post())
    }

    /// Delete a post. FK cascades remove its comments and reactions.
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }

        Ok(())
    }

    /// Latest-first feed of top-level posts visible to the requester.
    ///
    /// Ordering is (created_at DESC, id ASC); `after` pages forward from
    /// the cursor row, `before` fetches the page immediately preceding it
    /// (reversed scan, re-reversed in memory).
    async fn feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    JOIN users u ON u.id = p.author_id
                    WHERE p.is_comment = FALSE
                        AND (u.is_private = FALSE
                            OR p.author_id = $1
                            OR EXISTS (
                                SELECT 1 FROM follows f
                                WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                            ))
                    ORDER BY p.created_at DESC, p.id ASC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::After(cursor_id)) => {
                let pos = self.cursor_position(cursor_id).await?;
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    JOIN users u ON u.id = p.author_id
                    WHERE p.is_comment = FALSE
                        AND (u.is_private = FALSE
                            OR p.author_id = $1
                            OR EXISTS (
                                SELECT 1 FROM follows f
                                WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                            ))
                        AND (p.created_at < $3 OR (p.created_at = $3 AND p.id > $4))
                    ORDER BY p.created_at DESC, p.id ASC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
                .bind(limit)
                .bind(pos.created_at)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::Before(cursor_id)) => {
                let pos = self.cursor_position(cursor_id).await?;
                let mut rows = sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    JOIN users u ON u.id = p.author_id
                    WHERE p.is_comment = FALSE
                        AND (u.is_private = FALSE
                            OR p.author_id = $1
                            OR EXISTS (
                                SELECT 1 FROM follows f
                                WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                            ))
                        AND (p.created_at > $3 OR (p.created_at = $3 AND p.id < $4))
                    ORDER BY p.created_at ASC, p.id DESC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
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

    /// Latest-first feed restricted to authors the requester follows.
    /// A follow edge implies visibility, so no privacy predicate is
    /// needed here.
    async fn following_feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    WHERE p.is_comment = FALSE
                        AND EXISTS (
                            SELECT 1 FROM follows f
                            WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                        )
                    ORDER BY p.created_at DESC, p.id ASC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::After(cursor_id)) => {
                let pos = self.cursor_position(cursor_id).await?;
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    WHERE p.is_comment = FALSE
                        AND EXISTS (
                            SELECT 1 FROM follows f
                            WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                        )
                        AND (p.created_at < $3 OR (p.created_at = $3 AND p.id > $4))
                    ORDER BY p.created_at DESC, p.id ASC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
                .bind(limit)
                .bind(pos.created_at)
                .bind(pos.id)
                .fetch_all(&self.pool)
                .await?
            }
            Some(Cursor::Before(cursor_id)) => {
                let pos = self.cursor_position(cursor_id).await?;
                let mut rows = sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT p.id, p.author_id, p.content, p.images, p.is_comment, p.parent_id,
                           p.qty_likes, p.qty_retweets, p.qty_comments, p.created_at
                    FROM posts p
                    WHERE p.is_comment = FALSE
                        AND EXISTS (
                            SELECT 1 FROM follows f
                            WHERE f.follower_id = $1 AND f.followed_id = p.author_id
                        )
                        AND (p.created_at > $3 OR (p.created_at = $3 AND p.id < $4))
                    ORDER BY p.created_at ASC, p.id DESC
                    LIMIT $2
                    "#,
                )
                .bind(requester_id)
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

    /// An author's top-level posts, latest first. Author visibility is
    /// resolved by the caller.
    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let limit = page.limit();

        let rows = match page.cursor() {
            None => {
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = FALSE
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
                let pos = self.cursor_position(cursor_id).await?;
                sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = FALSE
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
                let pos = self.cursor_position(cursor_id).await?;
                let mut rows = sqlx::query_as::<_, PostRow>(
                    r#"
                    SELECT id, author_id, content, images, is_comment, parent_id,
                           qty_likes, qty_retweets, qty_comments, created_at
                    FROM posts
                    WHERE author_id = $1 AND is_comment = FALSE
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
