//! Comment service
//!
//! Handles comment operations: create (with target resolution and
//! inheritance from the parent), tree assembly, author-only delete,
//! and like toggling.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{Comment, CommentTarget, Database, EntityId, User};
use crate::error::AppError;

/// A comment with presentation data attached
///
/// `replies` is rebuilt from the flat records on every fetch; it is
/// never stored.
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub comment: Comment,
    /// Author record, if still present in the user directory
    pub author: Option<User>,
    /// IDs of users who like this comment
    pub like_user_ids: Vec<String>,
    pub replies: Vec<CommentNode>,
}

/// Comment service
pub struct CommentService {
    db: Arc<Database>,
    max_content_chars: usize,
}

impl CommentService {
    /// Create new comment service
    pub fn new(db: Arc<Database>, max_content_chars: usize) -> Self {
        Self {
            db,
            max_content_chars,
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Create a new comment or reply
    ///
    /// # Target resolution
    /// An explicit post/video target wins. Without one, the target is
    /// inherited from the parent comment; a reply whose parent cannot be
    /// found fails with `NotFound`. A comment that resolves to no target
    /// at all, or to both targets, is rejected.
    ///
    /// # Returns
    /// The created comment; likes start empty.
    pub async fn create(
        &self,
        author_id: &str,
        text: String,
        post_id: Option<String>,
        video_id: Option<String>,
        parent_id: Option<String>,
    ) -> Result<Comment, AppError> {
        let post_id = normalize_optional_id(post_id);
        let video_id = normalize_optional_id(video_id);
        let parent_id = normalize_optional_id(parent_id);

        let target = match resolve_explicit_target(post_id, video_id)? {
            Some(target) => target,
            None => match parent_id.as_deref() {
                Some(parent_id) => {
                    let parent = self
                        .db
                        .get_comment(parent_id)
                        .await?
                        .ok_or(AppError::NotFound)?;
                    parent.target().ok_or_else(|| {
                        AppError::Validation(
                            "parent comment is not attached to a post or a video".to_string(),
                        )
                    })?
                }
                None => {
                    return Err(AppError::Validation(
                        "comment must target a post or a video".to_string(),
                    ));
                }
            },
        };

        let content = text.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation("comment text is required".to_string()));
        }
        if content.chars().count() > self.max_content_chars {
            return Err(AppError::Validation(format!(
                "comment text must be at most {} characters",
                self.max_content_chars
            )));
        }

        let comment = Comment {
            id: EntityId::new().0,
            author_id: author_id.to_string(),
            content,
            post_id: target.post_id().map(ToOwned::to_owned),
            video_id: target.video_id().map(ToOwned::to_owned),
            parent_id,
            created_at: chrono::Utc::now(),
        };

        self.db.insert_comment(&comment).await?;

        Ok(comment)
    }

    /// Build the reply tree for a post or video
    ///
    /// Fetches the flat records newest-first and nests each comment under
    /// its parent when the parent is part of the result set. Comments
    /// whose parent is missing (deleted) are promoted to top level.
    /// Authors and like sets are batch-loaded.
    pub async fn tree(&self, target: &CommentTarget) -> Result<Vec<CommentNode>, AppError> {
        let comments = self.db.get_comments_by_target(target).await?;

        let comment_ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let mut like_map = self.db.get_comment_like_map(&comment_ids).await?;

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let authors: HashMap<String, User> = self
            .db
            .get_users_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(build_reply_tree(comments, &authors, &mut like_map))
    }

    /// Delete a comment
    ///
    /// Only the author may delete. Children are not cascaded; they appear
    /// as top-level orphans on the next tree fetch.
    pub async fn delete(&self, comment_id: &str, requester_id: &str) -> Result<Comment, AppError> {
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if comment.author_id != requester_id {
            return Err(AppError::Forbidden);
        }

        self.db.delete_comment(comment_id).await?;

        Ok(comment)
    }

    /// Toggle the requester's like on a comment
    ///
    /// # Returns
    /// The new like count and whether the requester now likes the comment.
    pub async fn toggle_like(
        &self,
        comment_id: &str,
        requester_id: &str,
    ) -> Result<(i64, bool), AppError> {
        if self.db.get_comment(comment_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        self.db.toggle_comment_like(comment_id, requester_id).await
    }
}

// =============================================================================
// Content association policy
// =============================================================================

/// Resolve an explicitly supplied target.
///
/// Supplying both a post and a video is rejected; supplying neither
/// defers to parent inheritance.
fn resolve_explicit_target(
    post_id: Option<String>,
    video_id: Option<String>,
) -> Result<Option<CommentTarget>, AppError> {
    match (post_id, video_id) {
        (Some(_), Some(_)) => Err(AppError::Validation(
            "comment cannot target both a post and a video".to_string(),
        )),
        (Some(post_id), None) => Ok(Some(CommentTarget::Post(post_id))),
        (None, Some(video_id)) => Ok(Some(CommentTarget::Video(video_id))),
        (None, None) => Ok(None),
    }
}

/// Legacy clients send empty strings for absent identifiers.
fn normalize_optional_id(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Tree assembly
// =============================================================================

/// Nest flat comment records into a reply tree.
///
/// Input order (newest first) is preserved at every level; siblings are
/// not re-sorted. A comment is attached under its parent only when the
/// parent id is present in the result set and differs from its own id,
/// so malformed records drop to top level instead of recursing.
fn build_reply_tree(
    comments: Vec<Comment>,
    authors: &HashMap<String, User>,
    like_map: &mut HashMap<String, Vec<String>>,
) -> Vec<CommentNode> {
    let ids: std::collections::HashSet<String> =
        comments.iter().map(|c| c.id.clone()).collect();

    let mut roots: Vec<Comment> = Vec::new();
    let mut children: HashMap<String, Vec<Comment>> = HashMap::new();
    for comment in comments {
        let parent = comment
            .parent_id
            .clone()
            .filter(|parent_id| ids.contains(parent_id) && *parent_id != comment.id);
        match parent {
            Some(parent_id) => children.entry(parent_id).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    roots
        .into_iter()
        .map(|comment| attach_replies(comment, &mut children, authors, like_map))
        .collect()
}

fn attach_replies(
    comment: Comment,
    children: &mut HashMap<String, Vec<Comment>>,
    authors: &HashMap<String, User>,
    like_map: &mut HashMap<String, Vec<String>>,
) -> CommentNode {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_replies(child, children, authors, like_map))
        .collect();

    CommentNode {
        author: authors.get(&comment.author_id).cloned(),
        like_user_ids: like_map.remove(&comment.id).unwrap_or_default(),
        replies,
        comment,
    }
}
