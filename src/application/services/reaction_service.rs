//! Reaction Service
//!
//! Adding and removing LIKE/RETWEET reactions with post counter
//! maintenance.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    FollowRepository, PostRepository, Reaction, ReactionRepository, ReactionType, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Reaction service trait
#[async_trait]
pub trait ReactionService: Send + Sync {
    /// React to a post; the post must exist and be visible, and the same
    /// reaction twice is a conflict
    async fn add_reaction(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: &str,
    ) -> Result<Reaction, AppError>;

    /// Remove the caller's reaction of the given type; returns whether a
    /// row was removed
    async fn remove_reaction(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: &str,
    ) -> Result<bool, AppError>;
}

/// ReactionService implementation
pub struct ReactionServiceImpl<R, P, U, F>
where
    R: ReactionRepository,
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    reaction_repo: Arc<R>,
    post_repo: Arc<P>,
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<R, P, U, F> ReactionServiceImpl<R, P, U, F>
where
    R: ReactionRepository,
    P: PostRepository,
    U: UserRepository,
    F: FollowRepository,
{
    pub fn new(
        reaction_repo: Arc<R>,
        post_repo: Arc<P>,
        user_repo: Arc<U>,
        follow_repo: Arc<F>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            user_repo,
            follow_repo,
            id_generator,
        }
    }

    fn parse_type(reaction_type: &str) -> Result<ReactionType, AppError> {
        ReactionType::parse(reaction_type).ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid reaction type '{}', expected LIKE or RETWEET",
                reaction_type
            ))
        })
    }
}

#[async_trait]
impl<R, P, U, F> ReactionService for ReactionServiceImpl<R, P, U, F>
where
    R: ReactionRepository + 'static,
    P: PostRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
{
    async fn add_reaction(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: &str,
    ) -> Result<Reaction, AppError> {
        let reaction_type = Self::parse_type(reaction_type)?;

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

        if !author.content_visible_without_follow(user_id)
            && !self.follow_repo.is_following(user_id, author.id).await?
        {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        // First-class duplicate check; the unique index backstops the
        // concurrent case inside the repository.
        if self.reaction_repo.exists(user_id, post.id, reaction_type).await? {
            return Err(AppError::Conflict("Reaction already exists".to_string()));
        }

        let reaction = Reaction::new(self.id_generator.generate(), user_id, post.id, reaction_type);
        self.reaction_repo.create(&reaction).await
    }

    async fn remove_reaction(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: &str,
    ) -> Result<bool, AppError> {
        let reaction_type = Self::parse_type(reaction_type)?;
        self.reaction_repo.delete(user_id, post_id, reaction_type).await
    }
}
