//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User (identity directory)
// =============================================================================

/// A registered user
///
/// Rows are provisioned by the external auth collaborator; this service
/// treats them as an identity directory (foreign keys and display names).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Opaque bearer token record
///
/// `access_token` holds the sha256 digest of the token, never the plaintext.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthToken {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Comment
// =============================================================================

/// A comment on a post or a video
///
/// Stored flat; the reply tree is rebuilt at read time from
/// (id, parent_id). Exactly one of `post_id`/`video_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    /// Post this comment is attached to
    pub post_id: Option<String>,
    /// Video this comment is attached to
    pub video_id: Option<String>,
    /// Parent comment for replies (null for top-level comments)
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// The content this comment is attached to, if the record is well-formed.
    pub fn target(&self) -> Option<CommentTarget> {
        match (&self.post_id, &self.video_id) {
            (Some(post_id), None) => Some(CommentTarget::Post(post_id.clone())),
            (None, Some(video_id)) => Some(CommentTarget::Video(video_id.clone())),
            _ => None,
        }
    }
}

/// The post or video a comment tree hangs off
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    Post(String),
    Video(String),
}

impl CommentTarget {
    pub fn post_id(&self) -> Option<&str> {
        match self {
            Self::Post(id) => Some(id),
            Self::Video(_) => None,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            Self::Post(_) => None,
            Self::Video(id) => Some(id),
        }
    }
}

// =============================================================================
// Friendship
// =============================================================================

/// Relationship record for an unordered user pair
///
/// One row per pair, keyed by (user_lo, user_hi) with user_lo < user_hi.
/// `requested_by` records who sent the pending request.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Friendship {
    pub user_lo: String,
    pub user_hi: String,
    /// Status: pending, accepted
    pub status: String,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// The other member of the pair.
    pub fn other(&self, user_id: &str) -> &str {
        if self.user_lo == user_id {
            &self.user_hi
        } else {
            &self.user_lo
        }
    }
}

/// Stored friendship states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendshipState {
    Pending,
    Accepted,
}

impl FriendshipState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
        }
    }
}

/// Derived relationship status between two users (not persisted)
///
/// Used for UI labeling. Priority when derived from a pair row:
/// friend, then incoming, then pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    /// Confirmed bidirectional friendship
    Friend,
    /// The other user has requested friendship with this user
    Incoming,
    /// This user has a request pending toward the other user
    Pending,
    /// No relationship
    None,
}

impl FriendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friend => "friend",
            Self::Incoming => "incoming",
            Self::Pending => "pending",
            Self::None => "none",
        }
    }
}
