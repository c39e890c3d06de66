//! WebSocket Connection Handler
//!
//! Upgrades authenticated connections and runs the per-session event
//! loop.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ClientEvent, ServerEvent};
use crate::application::dto::response::MessageResponse;
use crate::application::services::{Claims, MessageService, MessageServiceImpl};
use crate::infrastructure::repositories::{
    PgFollowRepository, PgMessageRepository, PgUserRepository,
};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Gateway query parameters
#[derive(Debug, Deserialize)]
pub struct GatewayParams {
    token: Option<String>,
}

/// WebSocket upgrade handler
///
/// The token is validated before the upgrade so bad credentials get a
/// plain 401 instead of a doomed socket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<GatewayParams>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let token = params
        .token
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    let user_id = decode_user_id(&token, &state.settings.jwt.secret)?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, user_id: i64) {
    let session_id = Uuid::new_v4().to_string();

    tracing::debug!(user_id = user_id, session_id = %session_id, "New WebSocket connection");

    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    state
        .gateway
        .register_session(session_id.clone(), user_id, tx.clone());

    // Spawn task to forward events from channel to WebSocket
    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Main receive loop
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_frame(&text, user_id, &tx, &state).await;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %session_id, "Connection closed");
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by axum
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Cleanup
    state.gateway.unregister_session(&session_id);
    sender_task.abort();

    tracing::info!(
        user_id = user_id,
        session_id = %session_id,
        "User disconnected"
    );
}

/// Handle one inbound frame
async fn handle_client_frame(
    text: &str,
    user_id: i64,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    state: &AppState,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            let _ = tx.send(ServerEvent::error(format!("Malformed frame: {}", e)));
            return;
        }
    };

    match event {
        ClientEvent::SendMessage { to, content } => {
            let receiver_id: i64 = match to.parse() {
                Ok(id) => id,
                Err(_) => {
                    let _ = tx.send(ServerEvent::error("Invalid user ID"));
                    return;
                }
            };

            match message_service(state)
                .send_message(user_id, receiver_id, &content)
                .await
            {
                Ok(message) => {
                    let (from_id, to_id) = (message.from_id, message.to_id);
                    let event = ServerEvent::NewMessage(MessageResponse::from(message));
                    state.gateway.send_to_user(from_id, &event);
                    state.gateway.send_to_user(to_id, &event);
                }
                Err(e) => {
                    let _ = tx.send(ServerEvent::error(e.to_string()));
                }
            }
        }
    }
}

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

/// Validate a JWT and extract the user ID
fn decode_user_id(token: &str, secret: &str) -> Result<i64, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Unauthorized("Token expired".into())
        }
        _ => AppError::Unauthorized("Invalid token".into()),
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))
}
