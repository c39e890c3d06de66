//! # Domain Entities
//!
//! Core domain entities representing the main business objects in the
//! social network. All entities map directly to their corresponding
//! database tables.
//!
//! ## Core Entities
//!
//! - **User**: Account with authentication data, profile, and privacy flag
//! - **Post**: A post or comment (comments are posts with `is_comment` set)
//! - **Follow**: A directed edge in the social graph
//! - **Reaction**: A LIKE or RETWEET on a post
//! - **Message**: A direct message between two users
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod follow;
mod message;
mod post;
mod reaction;
mod user;

// Re-export User entity and related types
pub use user::{User, UserRepository};

// Re-export Post entity and related types
// Note: comments share the Post entity; CommentRepository scopes access
pub use post::{CommentRepository, Post, PostRepository, MAX_CONTENT_LENGTH, MAX_IMAGES};

// Re-export Follow entity and related types
pub use follow::{Follow, FollowRepository};

// Re-export Reaction entity and related types
pub use reaction::{Reaction, ReactionRepository, ReactionType};

// Re-export Message entity and related types
pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};
