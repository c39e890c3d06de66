//! Authentication Handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};

use crate::application::dto::request::{LoginRequest, SignupRequest};
use crate::application::dto::response::{TokenResponse, ValidResponse};
use crate::application::services::{AuthService, AuthServiceImpl, AuthTokens};
use crate::infrastructure::repositories::PgUserRepository;
use crate::shared::error::AppError;
use crate::shared::validation::validate;
use crate::startup::AppState;

fn auth_service(state: &AppState) -> impl AuthService {
    let user_repo = Arc::new(PgUserRepository::new(state.db.clone()));
    AuthServiceImpl::new(
        user_repo,
        state.snowflake.clone(),
        state.settings.jwt.clone(),
    )
}

fn token_response(user_id: i64, tokens: AuthTokens) -> TokenResponse {
    TokenResponse {
        user_id: user_id.to_string(),
        access_token: tokens.access_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    }
}

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    validate(&body)?;

    let (user, tokens) = auth_service(&state)
        .signup(
            &body.username,
            &body.email,
            &body.password,
            body.name.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(token_response(user.id, tokens))))
}

/// Login with email or username
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    validate(&body)?;

    let (user, tokens) = auth_service(&state)
        .login(body.email.as_deref(), body.username.as_deref(), &body.password)
        .await?;

    Ok(Json(token_response(user.id, tokens)))
}

/// Check whether the presented bearer token is valid
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ValidResponse> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let valid = match token {
        Some(token) => auth_service(&state).validate_token(token).await.is_ok(),
        None => false,
    };

    Json(ValidResponse { valid })
}
