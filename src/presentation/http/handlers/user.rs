//! User Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    OffsetQueryParams, PresignQueryParams, PrivacyRequest, SearchQueryParams,
};
use crate::application::dto::response::{
    PresignedUrlResponse, UserProfileResponse, UserViewResponse,
};
use crate::application::services::{UserProfile, UserService, UserServiceImpl};
use crate::infrastructure::repositories::{PgFollowRepository, PgUserRepository};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::pagination::OffsetPagination;
use crate::startup::AppState;

fn user_service(state: &AppState) -> impl UserService {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    UserServiceImpl::new(user_repo, follow_repo)
}

/// Recommended accounts to follow
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<OffsetQueryParams>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let page = OffsetPagination {
        limit: query.limit,
        skip: query.skip,
    };

    let users = user_service(&state)
        .recommendations(auth.user_id, page)
        .await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}

/// Get current authenticated user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserViewResponse>, AppError> {
    let user = user_service(&state).get_user(auth.user_id).await?;

    Ok(Json(UserViewResponse::from(user)))
}

/// Search users by username substring
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQueryParams>,
) -> Result<Json<Vec<UserViewResponse>>, AppError> {
    let page = OffsetPagination {
        limit: query.limit,
        skip: query.skip,
    };

    let users = user_service(&state).search(&query.username, page).await?;

    Ok(Json(users.into_iter().map(UserViewResponse::from).collect()))
}

/// Public profile by ID, with relation flags for authenticated viewers
pub async fn get_user(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()))?;

    let viewer_id = auth.map(|Extension(auth)| auth.user_id);

    let profile = user_service(&state).get_profile(viewer_id, user_id).await?;

    let response = match profile {
        UserProfile {
            user,
            follows_you: Some(follows_you),
            followed_by_you: Some(followed_by_you),
        } => UserProfileResponse::with_relation(user, follows_you, followed_by_you),
        UserProfile { user, .. } => UserProfileResponse::from_user(user),
    };

    Ok(Json(response))
}

/// Delete own account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    user_service(&state).delete_account(auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Toggle account privacy
pub async fn set_private(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<PrivacyRequest>,
) -> Result<Json<UserViewResponse>, AppError> {
    let user = user_service(&state)
        .set_private(auth.user_id, body.is_private)
        .await?;

    Ok(Json(UserViewResponse::from(user)))
}

/// Pre-signed upload URL for a new profile picture
///
/// The public URL is persisted on the profile immediately; the client is
/// expected to complete the PUT it was granted.
pub async fn profile_picture_presigned_url(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PresignQueryParams>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let upload = state
        .storage
        .presigned_upload_url("avatars", &query.filetype)
        .await?;

    user_service(&state)
        .set_profile_picture(auth.user_id, &upload.file_url)
        .await?;

    Ok(Json(PresignedUrlResponse::from(upload)))
}
