//! User Service
//!
//! Profile reads, privacy toggling, search, recommendations, and account
//! deletion.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{FollowRepository, User, UserRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::OffsetPagination;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Fetch a user by ID, failing with not-found when missing
    async fn get_user(&self, user_id: i64) -> Result<User, AppError>;

    /// Public profile card with relation flags when a viewer is known
    async fn get_profile(
        &self,
        viewer_id: Option<i64>,
        user_id: i64,
    ) -> Result<UserProfile, AppError>;

    /// Case-insensitive substring search over usernames
    async fn search(&self, term: &str, page: OffsetPagination) -> Result<Vec<User>, AppError>;

    /// Accounts followed by accounts the caller follows, minus self and
    /// already-followed users
    async fn recommendations(
        &self,
        user_id: i64,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError>;

    /// Toggle the account privacy flag
    async fn set_private(&self, user_id: i64, is_private: bool) -> Result<User, AppError>;

    /// Persist a new profile picture URL
    async fn set_profile_picture(&self, user_id: i64, url: &str) -> Result<User, AppError>;

    /// Delete the account; FK cascades remove owned content
    async fn delete_account(&self, user_id: i64) -> Result<(), AppError>;
}

/// Profile card plus viewer-relative relation flags.
///
/// Flags are None for anonymous viewers and self-views.
#[derive(Debug)]
pub struct UserProfile {
    pub user: User,
    pub follows_you: Option<bool>,
    pub followed_by_you: Option<bool>,
}

/// UserService implementation
pub struct UserServiceImpl<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
}

impl<U, F> UserServiceImpl<U, F>
where
    U: UserRepository,
    F: FollowRepository,
{
    pub fn new(user_repo: Arc<U>, follow_repo: Arc<F>) -> Self {
        Self {
            user_repo,
            follow_repo,
        }
    }
}

#[async_trait]
impl<U, F> UserService for UserServiceImpl<U, F>
where
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
{
    async fn get_user(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn get_profile(
        &self,
        viewer_id: Option<i64>,
        user_id: i64,
    ) -> Result<UserProfile, AppError> {
        let user = self.get_user(user_id).await?;

        match viewer_id {
            Some(viewer) if viewer != user.id => {
                let follows_you = self.follow_repo.is_following(user.id, viewer).await?;
                let followed_by_you = self.follow_repo.is_following(viewer, user.id).await?;

                Ok(UserProfile {
                    user,
                    follows_you: Some(follows_you),
                    followed_by_you: Some(followed_by_you),
                })
            }
            _ => Ok(UserProfile {
                user,
                follows_you: None,
                followed_by_you: None,
            }),
        }
    }

    async fn search(&self, term: &str, page: OffsetPagination) -> Result<Vec<User>, AppError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::Validation(
                "Search term must not be empty".to_string(),
            ));
        }

        self.user_repo.search_by_username(term, page).await
    }

    async fn recommendations(
        &self,
        user_id: i64,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError> {
        self.user_repo.recommendations(user_id, page).await
    }

    async fn set_private(&self, user_id: i64, is_private: bool) -> Result<User, AppError> {
        self.user_repo.set_private(user_id, is_private).await
    }

    async fn set_profile_picture(&self, user_id: i64, url: &str) -> Result<User, AppError> {
        self.user_repo.set_profile_picture(user_id, url).await
    }

    async fn delete_account(&self, user_id: i64) -> Result<(), AppError> {
        self.user_repo.delete(user_id).await
    }
}
