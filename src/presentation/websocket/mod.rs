//! WebSocket Gateway
//!
//! Real-time messaging channel.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::Gateway;
pub use handler::ws_handler;
pub use messages::{ClientEvent, ServerEvent};
pub use session::ConnectedSession;
