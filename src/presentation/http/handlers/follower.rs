//! Follower Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::response::{FollowResponse, RemovedResponse, UserViewResponse};
use crate::application::services::{FollowService, FollowServiceImpl};
use crate::infrastructure::repositories::{PgFollowRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn follow_service(state: &AppState) -> impl FollowService {
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    FollowServiceImpl::new(follow_repo, user_repo, state.snowflake.clone())
}

fn parse_user_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))
}

/// Follow a user
pub async fn follow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<FollowResponse>), AppError> {
    let target_id = parse_user_id(&user_id)?;

    let follow = follow_service(&state).follow(auth.user_id, target_id).await?;

    Ok((StatusCode::CREATED, Json(FollowResponse::from(follow))))
}

/// Unfollow a user
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Result<Json<RemovedResponse>, AppError> {
    let target_id = parse_user_id(&user_id)?;

    let removed = follow_service(&state)
        .unfollow(auth.user_id, target_id)
        .await?;

    Ok(Json(RemovedResponse { removed }))
}

/// Users following the caller
pub async fn followers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let users = follow_service(&state).followers(auth.user_id).await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}

/// Users the caller follows
pub async fn following(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let users = follow_service(&state).following(auth.user_id).await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}

/// Users who follow the caller and are followed back
pub async fn mutuals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let users = follow_service(&state).mutuals(auth.user_id).await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}
