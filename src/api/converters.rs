//! Conversion functions from database models to API DTOs

use crate::api::dto::*;
use crate::auth::AuthUser;
use crate::data::{Comment, FriendStatus, User};
use crate::service::CommentNode;

/// Convert a user record to an author reference.
///
/// Identity records are not guaranteed to resolve (a user may have been
/// removed from the directory); the raw id degrades gracefully into both
/// display fields.
pub fn author_to_response(author_id: &str, user: Option<&User>) -> AuthorResponse {
    match user {
        Some(user) => AuthorResponse {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| user.username.clone()),
        },
        None => AuthorResponse {
            id: author_id.to_string(),
            username: author_id.to_string(),
            display_name: author_id.to_string(),
        },
    }
}

/// Convert the authenticated caller to an author reference
pub fn auth_user_to_author(user: &AuthUser) -> AuthorResponse {
    AuthorResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        display_name: user.display_name().to_string(),
    }
}

/// Convert a bare comment record to its response shape
pub fn comment_to_response(
    comment: &Comment,
    author: AuthorResponse,
    likes: Vec<String>,
    replies: Vec<CommentResponse>,
) -> CommentResponse {
    CommentResponse {
        id: comment.id.clone(),
        author,
        content: comment.content.clone(),
        created_at: comment.created_at,
        parent_id: comment.parent_id.clone(),
        post_id: comment.post_id.clone(),
        video_id: comment.video_id.clone(),
        likes,
        replies,
    }
}

/// Convert an assembled tree node (recursively) to its response shape
pub fn comment_node_to_response(node: CommentNode) -> CommentResponse {
    let author = author_to_response(&node.comment.author_id, node.author.as_ref());
    let replies = node
        .replies
        .into_iter()
        .map(comment_node_to_response)
        .collect();

    comment_to_response(&node.comment, author, node.like_user_ids, replies)
}

/// Convert a user record to its response shape
pub fn user_to_response(user: &User, friend_status: Option<FriendStatus>) -> UserResponse {
    UserResponse {
        id: user.id.clone(),
        username: user.username.clone(),
        display_name: user
            .display_name
            .clone()
            .unwrap_or_else(|| user.username.clone()),
        created_at: user.created_at,
        friend_status,
    }
}
