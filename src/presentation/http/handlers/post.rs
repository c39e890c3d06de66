//! Post Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreatePostRequest, CursorQueryParams, PresignQueryParams};
use crate::application::dto::response::{PostResponse, PresignedUrlResponse};
use crate::application::services::{PostService, PostServiceImpl};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgPostRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::CursorPagination;
use crate::shared::validation::validate;
use crate::startup::AppState;

fn post_service(state: &AppState) -> impl PostService {
    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    PostServiceImpl::new(post_repo, user_repo, follow_repo, state.snowflake.clone())
}

fn parse_post_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))
}

/// Create a new top-level post
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    validate(&body)?;

    let post = post_service(&state)
        .create_post(auth.user_id, body.content, body.images)
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// Latest feed of visible top-level posts
pub async fn feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let posts = post_service(&state).feed(auth.user_id, page).await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Feed restricted to followed authors
pub async fn following_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let posts = post_service(&state).following_feed(auth.user_id, page).await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Single post lookup, visibility-gated
pub async fn get_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let post_id = parse_post_id(&post_id)?;

    let post = post_service(&state).get_post(auth.user_id, post_id).await?;

    Ok(Json(PostResponse::from(post)))
}

/// A user's top-level posts
pub async fn posts_by_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(query): Query<CursorQueryParams>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    let page = CursorPagination::parse(query.limit, query.before.as_deref(), query.after.as_deref())?;

    let posts = post_service(&state)
        .posts_by_user(auth.user_id, user_id, page)
        .await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// Delete own post
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let post_id = parse_post_id(&post_id)?;

    post_service(&state).delete_post(auth.user_id, post_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Pre-signed upload URL for a post image
pub async fn image_presigned_url(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
    Query(query): Query<PresignQueryParams>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let upload = state
        .storage
        .presigned_upload_url("images", &query.filetype)
        .await?;

    Ok(Json(PresignedUrlResponse::from(upload)))
}
