//! Message Service
//!
//! Direct messaging between mutually-following users.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    FollowRepository, Message, MessageRepository, User, UserRepository, MAX_MESSAGE_LENGTH,
};
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::snowflake::SnowflakeGenerator;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Send a direct message. The receiver must exist (not-found first)
    /// and the pair must mutually follow each other (forbidden).
    async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Message, AppError>;

    /// Both directions of the conversation with another user, newest
    /// first, cursor-paginated
    async fn conversation(
        &self,
        user_id: i64,
        other_user_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Message>, AppError>;

    /// Distinct conversation partners, most recent first
    async fn conversations(&self, user_id: i64) -> Result<Vec<User>, AppError>;
}

/// MessageService implementation
pub struct MessageServiceImpl<M, U, F>
where
    M: MessageRepository,
    U: UserRepository,
    F: FollowRepository,
{
    message_repo: Arc<M>,
    user_repo: Arc<U>,
    follow_repo: Arc<F>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<M, U, F> MessageServiceImpl<M, U, F>
where
    M: MessageRepository,
    U: UserRepository,
    F: FollowRepository,
{
    pub fn new(
        message_repo: Arc<M>,
        user_repo: Arc<U>,
        follow_repo: Arc<F>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            message_repo,
            user_repo,
            follow_repo,
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
impl<M, U, F> MessageService for MessageServiceImpl<M, U, F>
where
    M: MessageRepository + 'static,
    U: UserRepository + 'static,
    F: FollowRepository + 'static,
{
    async fn send_message(
        &self,
        sender_id: i64,
        receiver_id: i64,
        content: &str,
    ) -> Result<Message, AppError> {
        if sender_id == receiver_id {
            return Err(AppError::Validation(
                "You cannot message yourself".to_string(),
            ));
        }

        let content = content.trim();
        if content.is_empty() || content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::Validation(format!(
                "Content must be 1-{} characters",
                MAX_MESSAGE_LENGTH
            )));
        }

        // Existence is checked before eligibility so a missing receiver
        // reads as not-found, not forbidden.
        self.require_user(receiver_id).await?;

        if !self.follow_repo.is_mutual(sender_id, receiver_id).await? {
            return Err(AppError::Forbidden(
                "You can only message users who follow you back".to_string(),
            ));
        }

        let message = Message::new(
            self.id_generator.generate(),
            sender_id,
            receiver_id,
            content.to_string(),
        );

        self.message_repo.create(&message).await
    }

    async fn conversation(
        &self,
        user_id: i64,
        other_user_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Message>, AppError> {
        self.require_user(other_user_id).await?;
        self.message_repo.conversation(user_id, other_user_id, page).await
    }

    async fn conversations(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.message_repo.conversation_partners(user_id).await
    }
}
