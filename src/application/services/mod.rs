//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Signup, login, JWT access tokens
//! - **UserService**: Profiles, privacy, search, recommendations
//! - **PostService**: Posts, feeds, visibility-gated reads
//! - **CommentService**: Comments with parent counter maintenance
//! - **ReactionService**: Likes and retweets
//! - **FollowService**: The follow graph
//! - **MessageService**: Direct messages between mutual followers

pub mod auth_service;
pub mod comment_service;
pub mod follow_service;
pub mod message_service;
pub mod post_service;
pub mod reaction_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{AuthService, AuthServiceImpl, AuthTokens, Claims};

// Re-export user service types
pub use user_service::{UserProfile, UserService, UserServiceImpl};

// Re-export post service types
pub use post_service::{PostService, PostServiceImpl};

// Re-export comment service types
pub use comment_service::{CommentService, CommentServiceImpl};

// Re-export reaction service types
pub use reaction_service::{ReactionService, ReactionServiceImpl};

// Re-export follow service types
pub use follow_service::{FollowService, FollowServiceImpl};

// Re-export message service types
pub use message_service::{MessageService, MessageServiceImpl};
