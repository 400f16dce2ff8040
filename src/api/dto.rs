//! API response DTOs
//!
//! Wire shapes for the HuddleUp REST API. Field names keep the legacy
//! camelCase/`_id` convention the existing clients expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::FriendStatus;

/// Comment author, normalized to id plus display data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub display_name: String,
}

/// Comment with its nested replies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: AuthorResponse,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<String>,
    pub post_id: Option<String>,
    pub video_id: Option<String>,
    /// IDs of users who like this comment
    pub likes: Vec<String>,
    pub replies: Vec<CommentResponse>,
}

/// Like toggle result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    /// Like count after the toggle
    pub likes: i64,
    /// Whether the caller now likes the comment
    pub liked: bool,
}

/// Comment deletion result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub deleted: bool,
}

/// User record for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    /// Relationship to the caller; present on discovery listings only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friend_status: Option<FriendStatus>,
}

/// Result of a friend-graph mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipResponse {
    /// The other user in the relationship
    #[serde(rename = "_id")]
    pub id: String,
    pub status: FriendStatus,
}
