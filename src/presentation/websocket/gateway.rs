//! WebSocket Gateway
//!
//! Session registry and per-user event fan-out.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::messages::ServerEvent;
use super::session::ConnectedSession;
use crate::infrastructure::metrics;

/// WebSocket gateway managing all live connections
pub struct Gateway {
    /// Active sessions by session_id
    sessions: DashMap<String, Arc<ConnectedSession>>,
    /// User ID to session IDs mapping (one user can have multiple sessions)
    user_sessions: DashMap<i64, Vec<String>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            user_sessions: DashMap::new(),
        }
    }

    /// Register a new connected session
    pub fn register_session(
        &self,
        session_id: String,
        user_id: i64,
        sender: mpsc::UnboundedSender<ServerEvent>,
    ) {
        let session = Arc::new(ConnectedSession::new(session_id.clone(), user_id, sender));

        self.sessions.insert(session_id.clone(), session);

        self.user_sessions
            .entry(user_id)
            .or_default()
            .push(session_id.clone());

        metrics::websocket_session_opened();

        tracing::info!(
            user_id = user_id,
            session_id = %session_id,
            "Session registered"
        );
    }

    /// Unregister a session
    pub fn unregister_session(&self, session_id: &str) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            if let Some(mut sessions) = self.user_sessions.get_mut(&session.user_id) {
                sessions.retain(|s| s != session_id);
            }
            self.user_sessions
                .remove_if(&session.user_id, |_, sessions| sessions.is_empty());

            metrics::websocket_session_closed();

            tracing::info!(
                user_id = session.user_id,
                session_id = %session_id,
                "Session unregistered"
            );
        }
    }

    /// Send an event to every live session of a user.
    ///
    /// Returns the number of sessions the event was queued for. Dead
    /// channels are skipped; their sessions are torn down by their own
    /// connection tasks.
    pub fn send_to_user(&self, user_id: i64, event: &ServerEvent) -> usize {
        let mut delivered = 0;

        if let Some(session_ids) = self.user_sessions.get(&user_id) {
            for session_id in session_ids.value() {
                if let Some(session) = self.sessions.get(session_id) {
                    if session.send(event.clone()) {
                        delivered += 1;
                    }
                }
            }
        }

        delivered
    }

    /// Get session count
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check if user is online (has at least one session)
    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.user_sessions
            .get(&user_id)
            .map(|sessions| !sessions.is_empty())
            .unwrap_or(false)
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}
