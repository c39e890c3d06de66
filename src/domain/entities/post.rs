//! Post entity and repository trait.
//!
//! Posts and comments share the `posts` table: a comment is a row with
//! `is_comment = TRUE` and a `parent_id` pointing at the post it replies
//! to. Denormalized engagement counters live on the row and are kept in
//! step with the reactions/comments tables by the repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;

/// Maximum content length in characters
pub const MAX_CONTENT_LENGTH: usize = 240;

/// Maximum number of attached images
pub const MAX_IMAGES: usize = 4;

/// Represents a post or a comment.
///
/// Maps to the `posts` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - author_id: BIGINT NOT NULL REFERENCES users(id)
/// - content: VARCHAR(240) NOT NULL
/// - images: TEXT[] NOT NULL DEFAULT '{}'
/// - is_comment: BOOLEAN NOT NULL DEFAULT FALSE
/// - parent_id: BIGINT NULL REFERENCES posts(id)
/// - qty_likes / qty_retweets / qty_comments: INT NOT NULL DEFAULT 0
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Author (owning user)
    pub author_id: i64,

    /// Body text, at most [`MAX_CONTENT_LENGTH`] characters
    pub content: String,

    /// Attached image URLs, at most [`MAX_IMAGES`] entries
    pub images: Vec<String>,

    /// Whether this row is a comment on another post
    pub is_comment: bool,

    /// Parent post for comments
    pub parent_id: Option<i64>,

    /// Count of LIKE reactions
    pub qty_likes: i32,

    /// Count of RETWEET reactions
    pub qty_retweets: i32,

    /// Count of comments
    pub qty_comments: i32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Build a new top-level post with zeroed counters.
    pub fn new(id: i64, author_id: i64, content: String, images: Vec<String>) -> Self {
        Self {
            id,
            author_id,
            content,
            images,
            is_comment: false,
            parent_id: None,
            qty_likes: 0,
            qty_retweets: 0,
            qty_comments: 0,
            created_at: Utc::now(),
        }
    }

    /// Build a new comment on `parent_id` with zeroed counters.
    pub fn new_comment(
        id: i64,
        author_id: i64,
        content: String,
        images: Vec<String>,
        parent_id: i64,
    ) -> Self {
        Self {
            id,
            author_id,
            content,
            images,
            is_comment: true,
            parent_id: Some(parent_id),
            qty_likes: 0,
            qty_retweets: 0,
            qty_comments: 0,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for top-level post access.
///
/// Feed queries push the privacy predicate into SQL so a page is a single
/// query; point lookups leave the visibility decision to the service,
/// which already has the author row in hand.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find any post/comment row by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Insert a new top-level post.
    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    /// Delete a post by ID, cascading to its comments and reactions.
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Latest-first feed of top-level posts visible to `requester_id`
    /// (public authors, own posts, and followed private authors).
    async fn feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// Latest-first feed restricted to authors `requester_id` follows.
    async fn following_feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// An author's top-level posts, latest first. Callers are expected
    /// to have resolved visibility of the author already.
    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;
}

/// Repository trait for comment access (rows in `posts` with
/// `is_comment = TRUE`).
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Find a comment row by ID. Returns None for top-level posts.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Insert a comment and increment the parent's comment counter in
    /// one transaction.
    async fn create(&self, comment: &Post) -> Result<Post, AppError>;

    /// Delete a comment and decrement the parent's comment counter in
    /// one transaction.
    async fn delete(&self, comment_id: i64, parent_id: i64) -> Result<(), AppError>;

    /// Comments on a post ordered by engagement (likes desc, retweets
    /// desc, id asc), cursor-paginated.
    async fn by_post(
        &self,
        post_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// An author's comments, latest first.
    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;
}
