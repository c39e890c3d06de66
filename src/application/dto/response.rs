//! Response DTOs
//!
//! Data structures for API response bodies. All snowflake IDs are
//! serialized as decimal strings for JavaScript number-safety.

use serde::Serialize;

use crate::domain::{Follow, Message, Post, Reaction, User};
use crate::infrastructure::storage::PresignedUpload;

/// Authentication token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user_id: String,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Token validation response
#[derive(Debug, Serialize)]
pub struct ValidResponse {
    pub valid: bool,
}

/// Public profile card
#[derive(Debug, Serialize)]
pub struct UserViewResponse {
    pub id: String,
    pub name: Option<String>,
    pub username: String,
    pub profile_picture: Option<String>,
    pub is_private: bool,
}

impl From<User> for UserViewResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            username: user.username,
            profile_picture: user.profile_picture,
            is_private: user.is_private,
        }
    }
}

/// Profile card with relation flags, shown when the viewer is known
#[derive(Debug, Serialize)]
pub struct UserProfileResponse {
    pub id: String,
    pub name: Option<String>,
    pub username: String,
    pub profile_picture: Option<String>,
    pub is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follows_you: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followed_by_you: Option<bool>,
}

impl UserProfileResponse {
    /// Anonymous view: no relation flags.
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            username: user.username,
            profile_picture: user.profile_picture,
            is_private: user.is_private,
            follows_you: None,
            followed_by_you: None,
        }
    }

    /// Authenticated view: relation flags relative to the viewer.
    pub fn with_relation(user: User, follows_you: bool, followed_by_you: bool) -> Self {
        Self {
            follows_you: Some(follows_you),
            followed_by_you: Some(followed_by_you),
            ..Self::from_user(user)
        }
    }
}

/// Post or comment response
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub images: Vec<String>,
    pub is_comment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub qty_likes: i32,
    pub qty_retweets: i32,
    pub qty_comments: i32,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            author_id: post.author_id.to_string(),
            content: post.content,
            images: post.images,
            is_comment: post.is_comment,
            parent_id: post.parent_id.map(|id| id.to_string()),
            qty_likes: post.qty_likes,
            qty_retweets: post.qty_retweets,
            qty_comments: post.qty_comments,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Follow edge response
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub id: String,
    pub follower_id: String,
    pub followed_id: String,
    pub created_at: String,
}

impl From<Follow> for FollowResponse {
    fn from(follow: Follow) -> Self {
        Self {
            id: follow.id.to_string(),
            follower_id: follow.follower_id.to_string(),
            followed_id: follow.followed_id.to_string(),
            created_at: follow.created_at.to_rfc3339(),
        }
    }
}

/// Reaction response
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    #[serde(rename = "type")]
    pub reaction_type: String,
    pub created_at: String,
}

impl From<Reaction> for ReactionResponse {
    fn from(reaction: Reaction) -> Self {
        Self {
            id: reaction.id.to_string(),
            user_id: reaction.user_id.to_string(),
            post_id: reaction.post_id.to_string(),
            reaction_type: reaction.reaction_type.as_str().to_string(),
            created_at: reaction.created_at.to_rfc3339(),
        }
    }
}

/// Direct message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            from_id: message.from_id.to_string(),
            to_id: message.to_id.to_string(),
            content: message.content,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Removal outcome for idempotent deletes (unfollow, un-react)
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// Pre-signed upload grant response
#[derive(Debug, Serialize)]
pub struct PresignedUrlResponse {
    pub presigned_url: String,
    pub file_url: String,
    pub key: String,
}

impl From<PresignedUpload> for PresignedUrlResponse {
    fn from(upload: PresignedUpload) -> Self {
        Self {
            presigned_url: upload.presigned_url,
            file_url: upload.file_url,
            key: upload.key,
        }
    }
}
