//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod comment;
pub mod follower;
pub mod health;
pub mod message;
pub mod post;
pub mod reaction;
pub mod user;
