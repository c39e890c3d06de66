//! Comment Service
//!
//! Comment creation and deletion with parent counter maintenance, plus
//! visibility-gated comment listings.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    CommentRepository, FollowRepository, Post, PostRepository, User, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::snowflake::SnowflakeGenerator;

/// Comment service trait
#[async_trait]
pub trait CommentService: Send + Sync {
    /// Comment on a post; the parent must exist and be visible
    async fn create_comment(
        &self,
        author_id: i64,
        parent_post_id: i64,
        content: String,
        images: Vec<String>,
    ) -> Result<Post, AppError>;

    /// Comments on a post ordered by engagement; gated by the parent
    /// post's author visibility
    async fn comments_by_post(
        &self,
        requester_id: i64,
        post_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// A user's comments, latest first, visibility-gated
    async fn comments_by_user(
        &self,
        requester_id: i64,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError>;

    /// Delete own comment; decrements the parent's comment counter
    async fn delete_comment(&self, requester_id: i64, comment_id: i64) -> Result<(), AppError>;
}

/// CommentService implementation
pub struct CommentServiceImpl<C, P, U, F>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    comment_repo: Arc<C>,
    post_repo: Arc<P>,
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<C, P, U, F> CommentServiceImpl<C, P, U, F>
where
    C: CommentRepository,
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    pub fn new(
        comment_repo: Arc<C>,
        post_repo: Arc<P>,
        user_repo: Arc<U>,
        follow_repo: Arc<F>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            comment_repo,
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

    /// Fetch the parent post if it exists and its author's content is
    /// visible to the requester; obscured otherwise.
    async fn visible_parent(&self, requester_id: i64, post_id: i64) -> Result<Post, AppError> {
        let parent = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let author = self
            .user_repo
            .find_by_id(parent.author_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if !self.author_content_visible(requester_id, &author).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        Ok(parent)
    }
}

#[async_trait]
impl<C, P, U, F> CommentService for CommentServiceImpl<C, P, U, F>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
{
    async fn create_comment(
        &self,
        author_id: i64,
        parent_post_id: i64,
        content: String,
        images: Vec<String>,
    ) -> Result<Post, AppError> {
        let parent = self.visible_parent(author_id, parent_post_id).await?;

        let comment = Post::new_comment(
            self.id_generator.generate(),
            author_id,
            content,
            images,
            parent.id,
        );

        self.comment_repo.create(&comment).await
    }

    async fn comments_by_post(
        &self,
        requester_id: i64,
        post_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let parent = self.visible_parent(requester_id, post_id).await?;
        self.comment_repo.by_post(parent.id, page).await
    }

    async fn comments_by_user(
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

        self.comment_repo.by_author(author_id, page).await
    }

    async fn delete_comment(&self, requester_id: i64, comment_id: i64) -> Result<(), AppError> {
        let comment = self
            .comment_repo
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.author_id != requester_id {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        let parent_id = comment.parent_id.ok_or_else(|| {
            AppError::Internal("Comment row missing parent reference".to_string())
        })?;

        self.comment_repo.delete(comment.id, parent_id).await
    }
}
