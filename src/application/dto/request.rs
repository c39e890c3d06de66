//! Request DTOs
//!
//! Data structures for API request bodies and query parameters.

use serde::Deserialize;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 50, message = "Name must be at most 50 characters"))]
    pub name: Option<String>,
}

/// Login request
///
/// At least one of `email`/`username` must be present; the service
/// rejects identifier-less logins since the shape alone cannot.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub username: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Create post request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 240, message = "Content must be 1-240 characters"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 4, message = "At most 4 images per post"))]
    pub images: Vec<String>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 240, message = "Content must be 1-240 characters"))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 4, message = "At most 4 images per comment"))]
    pub images: Vec<String>,
}

/// Reaction request body
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    #[serde(rename = "type")]
    pub reaction_type: String,
}

/// Privacy toggle request
#[derive(Debug, Deserialize)]
pub struct PrivacyRequest {
    pub is_private: bool,
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 1000, message = "Content must be 1-1000 characters"))]
    pub content: String,
}

/// Cursor pagination query parameters
#[derive(Debug, Deserialize)]
pub struct CursorQueryParams {
    pub limit: Option<i64>,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// Offset pagination query parameters
#[derive(Debug, Deserialize)]
pub struct OffsetQueryParams {
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Username search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    pub username: String,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

/// Reaction type query parameter (for DELETE)
#[derive(Debug, Deserialize)]
pub struct ReactionTypeParams {
    #[serde(rename = "type")]
    pub reaction_type: String,
}

/// Pre-signed upload query parameters
#[derive(Debug, Deserialize)]
pub struct PresignQueryParams {
    pub filetype: String,
}
