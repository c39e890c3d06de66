//! Post Service
//!
//! Top-level post creation, deletion, feeds, and visibility-gated reads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{FollowRepository, Post, PostRepository, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::snowflake::SnowflakeGenerator;

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    /// Create a top-level post
    async fn create_post(
        &self,
        author_id: i64,
        content: String,
        images: Vec<String>,
    ) -> Result<Post, AppError>;

    /// Fetch a single post, obscured as not-found when the author's
    /// content is not visible to the requester
    async fn get_post(&self, requester_id: i64, post_id: i64) -> Result<Post, AppError>;

    /// Latest-first feed of visible top-level posts
    async fn feed(&self, requester_id: i64, page: CursorPagination)
        -> Result<Vec<Post>, AppError>;

    /// Feed restricted to authors the requester follows
    async fn following_feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// A user's top-level posts; a private, unfollowed author is
    /// reported as not-found
    async fn posts_by_user(
        &self,
        requester_id: i64,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// Delete own post; cascades comments and reactions
    async fn delete_post(&self, requester_id: i64, post_id: i64) -> Result<(), AppError>;
}

/// PostService implementation
pub struct PostServiceImpl<P, U, F>
where
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    post_repo: Arc<P>,
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<P, U, F> PostServiceImpl<P, U, F>
where
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    pub fn new(
        post_repo: Arc<P>,
        user_repo: Arc<U>,
        follow_repo: Arc<F>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            follow_repo,
            id_generator,
        }
    }

    /// Whether the requester may read this author's content.
    async fn author_content_visible(
        &self,
        requester_id: i64,
        author: &User,
    ) -> Result<bool, AppError> {
        if author.content_visible_without_follow(requester_id) {
            return Ok(true);
        }
        self.follow_repo.is_following(requester_id, author.id).await
    }
}

#[async_trait]
impl<P, U, F> PostService for PostServiceImpl<P, U, F>
where
    P: PostRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
{
    async fn create_post(
        &self,
        author_id: i64,
        content: String,
        images: Vec<String>,
    ) -> Result<Post, AppError> {
        let post = Post::new(self.id_generator.generate(), author_id, content, images);
        self.post_repo.create(&post).await
    }

    async fn get_post(&self, requester_id: i64, post_id: i64) -> Result<Post, AppError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let author = self
            .user_repo
            .find_by_id(post.author_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if !self.author_content_visible(requester_id, &author).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        Ok(post)
    }

    async fn feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        self.post_repo.feed(requester_id, page).await
    }

    async fn following_feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        self.post_repo.following_feed(requester_id, page).await
    }

    async fn posts_by_user(
        &self,
        requester_id: i64,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let author = self
            .user_repo
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !self.author_content_visible(requester_id, &author).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.post_repo.by_author(author_id, page).await
    }

    async fn delete_post(&self, requester_id: i64, post_id: i64) -> Result<(), AppError> {
        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .filter(|p| !p.is_comment)
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if post.author_id != requester_id {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        self.post_repo.delete(post.id).await
    }
}
