//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, optional_auth_middleware, track_metrics};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        // WebSocket gateway endpoint; the token is checked pre-upgrade
        .route("/gateway", get(ws_handler))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/user", user_routes(state.clone()))
        .nest("/post", post_routes(state.clone()))
        .nest("/comment", comment_routes(state.clone()))
        .nest("/reaction", reaction_routes(state.clone()))
        .nest("/follower", follower_routes(state.clone()))
        .nest("/message", message_routes(state))
        .nest("/health", health_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/validate", get(handlers::auth::validate_token))
}

/// User routes
///
/// The by-id profile lookup is public with optional authentication; the
/// rest requires a valid token.
fn user_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(handlers::user::recommendations))
        .route("/", delete(handlers::user::delete_account))
        .route("/me", get(handlers::user::get_me))
        .route("/search", get(handlers::user::search))
        .route("/private", post(handlers::user::set_private))
        .route(
            "/profile-picture/presigned-url",
            get(handlers::user::profile_picture_presigned_url),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let public = Router::new()
        .route("/{user_id}", get(handlers::user::get_user))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ));

    protected.merge(public)
}

/// Post routes (protected)
fn post_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::post::create_post))
        .route("/", get(handlers::post::feed))
        .route("/following", get(handlers::post::following_feed))
        .route(
            "/image/presigned-url",
            get(handlers::post::image_presigned_url),
        )
        .route("/by_user/{user_id}", get(handlers::post::posts_by_user))
        .route("/{post_id}", get(handlers::post::get_post))
        .route("/{post_id}", delete(handlers::post::delete_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Comment routes (protected)
fn comment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/by_user/{user_id}", get(handlers::comment::comments_by_user))
        .route("/{post_id}", post(handlers::comment::create_comment))
        .route("/{post_id}", get(handlers::comment::comments_by_post))
        .route("/{post_id}", delete(handlers::comment::delete_comment))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reaction routes (protected)
fn reaction_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{post_id}", post(handlers::reaction::add_reaction))
        .route("/{post_id}", delete(handlers::reaction::remove_reaction))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Follower routes (protected)
fn follower_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/follow/{user_id}", post(handlers::follower::follow))
        .route("/unfollow/{user_id}", post(handlers::follower::unfollow))
        .route("/followers", get(handlers::follower::followers))
        .route("/following", get(handlers::follower::following))
        .route("/mutuals", get(handlers::follower::mutuals))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Message routes (protected)
fn message_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/send/{receiver_id}", post(handlers::message::send_message))
        .route(
            "/conversation/{other_user_id}",
            get(handlers::message::conversation),
        )
        .route("/conversations", get(handlers::message::conversations))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Health check routes (public)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness))
}
