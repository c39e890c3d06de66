//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - Accounts, profile updates, search, recommendations
//! - **PostRepository** - Top-level posts and visibility-aware feeds
//! - **CommentRepository** - Comments with parent counter maintenance
//! - **FollowRepository** - The follow graph
//! - **ReactionRepository** - Likes and retweets with post counters
//! - **MessageRepository** - Direct messages with conversation pagination

pub mod comment_repository;
pub mod follow_repository;
pub mod message_repository;
pub mod post_repository;
pub mod reaction_repository;
pub mod user_repository;

pub use comment_repository::PgCommentRepository;
pub use follow_repository::PgFollowRepository;
pub use message_repository::PgMessageRepository;
pub use post_repository::PgPostRepository;
pub use reaction_repository::PgReactionRepository;
pub use user_repository::PgUserRepository;
