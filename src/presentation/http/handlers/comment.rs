//! Comment Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateCommentRequest, CursorQueryParams};
use crate::application::dto::response::PostResponse;
use crate::application::services::{CommentService, CommentServiceImpl};
use crate::infrastructure::repositories::{
    PgCommentRepository, PgFollowRepository, PgPostRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::validation::validate;
use crate::startup::AppState;

fn comment_service(state: &AppState) -> impl CommentService {
    let comment_repo = Arc::new(PgCommentRepository::new(state.db.clone()));
    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    CommentServiceImpl::new(
        comment_repo,
        post_repo,
        user_repo,
        follow_repo,
        state.snowflake.clone(),
    )
}

/// Comment on a post
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let post_id: i64 = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;

    validate(&body)?;

    let comment = comment_service(&state)
        .create_comment(auth.user_id, post_id, body.content, body.images)
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(comment))))
}

/// Comments on a post, ordered by engagement
pub async fn comments_by_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let post_id: i64 = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;

    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let comments = comment_service(&state)
        .comments_by_post(auth.user_id, post_id, page)
        .await?;

    Ok(Json(comments.into_iter().map(PostResponse::from).collect()))
}

/// A user's comments, latest first
pub async fn comments_by_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let comments = comment_service(&state)
        .comments_by_user(auth.user_id, user_id, page)
        .await?;

    Ok(Json(comments.into_iter().map(PostResponse::from).collect()))
}

/// Delete own comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let comment_id: i64 = comment_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid comment ID".into()))?;

    comment_service(&state)
        .delete_comment(auth.user_id, comment_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
