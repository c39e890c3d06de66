//! WebSocket Session State

use tokio::sync::mpsc;

use super::messages::ServerEvent;

/// A live gateway connection.
///
/// One user can hold several sessions (multiple tabs or devices); each
/// gets its own outbound channel.
pub struct ConnectedSession {
    pub user_id: i64,
    pub session_id: String,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectedSession {
    pub fn new(
        session_id: String,
        user_id: i64,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) -> Self {
        Self {
            user_id,
            session_id,
            sender,
        }
    }

    /// Queue an event for delivery; false when the session is gone.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
