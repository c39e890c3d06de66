//! Reaction Handlers

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{ReactionRequest, ReactionTypeParams};
use crate::application::dto::response::{ReactionResponse, RemovedResponse};
use crate::application::services::{ReactionService, ReactionServiceImpl};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgPostRepository, PgReactionRepository, PgUserRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

fn reaction_service(state: &AppState) -> impl ReactionService {
    let reaction_repo = Arc::new(PgReactionRepository::new(state.db.clone()));
    let post_repo = Arc::new(PgPostRepository::new(state.db.clone()));
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    let follow_repo = Arc::new(PgFollowRepository::new(state.db.clone()));
    ReactionServiceImpl::new(
        reaction_repo,
        post_repo,
        user_repo,
        follow_repo,
        state.snowflake.clone(),
    )
}

/// React to a post
pub async fn add_reaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Json(body): Json<ReactionRequest>,
) -> Result<(StatusCode, Json<ReactionResponse>), AppError> {
    let post_id: i64 = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;

    let reaction = reaction_service(&state)
        .add_reaction(auth.user_id, post_id, &body.reaction_type)
        .await?;

    Ok((StatusCode::CREATED, Json(ReactionResponse::from(reaction))))
}

/// Remove the caller's reaction of the given type
pub async fn remove_reaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<String>,
    Query(query): Query<ReactionTypeParams>,
) -> Result<Json<RemovedResponse>, AppError> {
    let post_id: i64 = post_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid post ID".into()))?;

    let removed = reaction_service(&state)
        .remove_reaction(auth.user_id, post_id, &query.reaction_type)
        .await?;

    Ok(Json(RemovedResponse { removed }))
}
