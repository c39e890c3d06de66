//! Follow Service
//!
//! Follow graph mutations and listings.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{Follow, FollowRepository, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Follow service trait
#[async_trait]
pub trait FollowService: Send + Sync {
    /// Follow a user; self-follows are invalid and duplicates conflict
    async fn follow(&self, follower_id: i64, target_id: i64) -> Result<Follow, AppError>;

    /// Unfollow a user; returns whether an edge was removed
    async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<bool, AppError>;

    /// Users following the given user
    async fn followers(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Users the given user follows
    async fn following(&self, user_id: i64) -> Result<Vec<User>, AppError>;

    /// Users in both of the above sets
    async fn mutuals(&self, user_id: i64) -> Result<Vec<User>, AppError>;
}

/// FollowService implementation
pub struct FollowServiceImpl<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    follow_repo: Arc<F>,
    user_repo: Arc<U>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<F, U> FollowServiceImpl<F, U>
where
    F: FollowRepository,
    U: UserRepository,
{
    pub fn new(follow_repo: Arc<F>, user_repo: Arc<U>, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_generator,
        }
    }

    async fn require_user(&self, user_id: i64) -> Result<(), AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[async_trait]
impl<F, U> FollowService for FollowServiceImpl<F, U>
where
    F: FollowRepository + 'static,
    U: UserRepository + 'static,
{
    async fn follow(&self, follower_id: i64, target_id: i64) -> Result<Follow, AppError> {
        if follower_id == target_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }

        self.require_user(target_id).await?;

        if self.follow_repo.is_following(follower_id, target_id).await? {
            return Err(AppError::Conflict("Already following this user".to_string()));
        }

        let follow = Follow::new(self.id_generator.generate(), follower_id, target_id);
        self.follow_repo.create(&follow).await
    }

    async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<bool, AppError> {
        self.require_user(target_id).await?;
        self.follow_repo.delete(follower_id, target_id).await
    }

    async fn followers(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.follow_repo.followers_of(user_id).await
    }

    async fn following(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.follow_repo.following_of(user_id).await
    }

    async fn mutuals(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.follow_repo.mutuals_of(user_id).await
    }
}
