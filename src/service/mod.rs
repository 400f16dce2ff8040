//! Service layer
//!
//! Business logic on top of the data layer:
//! - `CommentService`: comment tree, content association, like toggling
//! - `FriendService`: friend request state machine and derived views

mod comment;
mod friend;

pub use comment::{CommentNode, CommentService};
pub use friend::FriendService;
