//! WebSocket Event Types
//!
//! Wire format for the real-time messaging channel. Every frame is a
//! JSON object tagged by `event` with its payload under `data`.

use serde::{Deserialize, Serialize};

use crate::application::dto::response::MessageResponse;

/// Client-to-server events
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Send a direct message to another user
    SendMessage { to: String, content: String },
}

/// Server-to-client events
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A message was delivered to a conversation the session's user is
    /// part of
    NewMessage(MessageResponse),
    /// A frame could not be processed
    Error { message: String },
}

impl ServerEvent {
    /// Error event from any displayable cause
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
