//! Message Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CursorQueryParams, SendMessageRequest};
use crate::application::dto::response::{MessageResponse, UserViewResponse};
use crate::application::services::{MessageService, MessageServiceImpl};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgMessageRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::presentation::websocket::ServerEvent;
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::validation::validate;
use crate::startup::AppState;

fn message_service(state: &AppState) -> impl MessageService {
    let message_repo = Arc::new(PgMessageRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    MessageServiceImpl::new(
        message_repo,
        user_repo,
        follow_repo,
        state.snowflake.clone(),
    )
}

/// Send a direct message
///
/// On success the message is also pushed to every live gateway session
/// of both participants.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(receiver_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let receiver_id: i64 = receiver_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    validate(&body)?;

    let message = message_service(&state)
        .send_message(auth.user_id, receiver_id, &body.content)
        .await?;

    let (from_id, to_id) = (message.from_id, message.to_id);
    let response = MessageResponse::from(message);

    let event = ServerEvent::NewMessage(response.clone());
    state.gateway.send_to_user(from_id, &event);
    state.gateway.send_to_user(to_id, &event);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Conversation with another user, newest first
pub async fn conversation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(other_user_id): Path<String>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let other_user_id: i64 = other_user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let messages = message_service(&state)
        .conversation(auth.user_id, other_user_id, page)
        .await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// Distinct conversation partners, most recent first
pub async fn conversations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let users = message_service(&state).conversations(auth.user_id).await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}
