//! Friend service
//!
//! The friend-request state machine over pair records:
//! none -> pending -> friends, with decline back to none.
//! Per-user friend/incoming/sent sets are derived views.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{Database, FriendStatus, Friendship, FriendshipState, User};
use crate::error::AppError;

/// Friend service
pub struct FriendService {
    db: Arc<Database>,
}

impl FriendService {
    /// Create new friend service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Send a friend request
    ///
    /// # Errors
    /// - `Validation` for a self-request
    /// - `NotFound` if either user is missing
    /// - `Conflict` if any relationship already exists for the pair
    ///   (pending in either direction, or already friends)
    pub async fn send_request(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<FriendStatus, AppError> {
        if from_id == to_id {
            return Err(AppError::Validation(
                "cannot send a friend request to yourself".to_string(),
            ));
        }
        self.ensure_user_exists(from_id).await?;
        self.ensure_user_exists(to_id).await?;

        if !self.db.insert_friend_request(from_id, to_id).await? {
            return Err(AppError::Conflict(
                "a friend request is already pending or you are already friends".to_string(),
            ));
        }

        tracing::debug!(from = %from_id, to = %to_id, "Friend request sent");

        Ok(FriendStatus::Pending)
    }

    /// Accept a pending friend request
    ///
    /// One conditional write flips the pair to friends; every derived view
    /// (both friend lists, both pending sets) changes with it, so no
    /// observer can see a half-applied accept.
    pub async fn accept_request(
        &self,
        user_id: &str,
        requester_id: &str,
    ) -> Result<FriendStatus, AppError> {
        self.ensure_user_exists(user_id).await?;
        self.ensure_user_exists(requester_id).await?;

        if !self.db.accept_friend_request(user_id, requester_id).await? {
            return Err(AppError::Conflict(
                "no pending friend request from this user".to_string(),
            ));
        }

        tracing::debug!(user = %user_id, requester = %requester_id, "Friend request accepted");

        Ok(FriendStatus::Friend)
    }

    /// Decline a pending friend request
    ///
    /// Declining a request that does not exist is a silent no-op.
    pub async fn decline_request(
        &self,
        user_id: &str,
        requester_id: &str,
    ) -> Result<FriendStatus, AppError> {
        self.ensure_user_exists(user_id).await?;
        self.ensure_user_exists(requester_id).await?;

        let removed = self.db.delete_friend_request(user_id, requester_id).await?;
        if !removed {
            tracing::debug!(
                user = %user_id,
                requester = %requester_id,
                "Decline without a pending request; nothing to do"
            );
        }

        Ok(FriendStatus::None)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Confirmed friends, newest edge first
    pub async fn friends(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let ids = self.db.get_friend_ids(user_id).await?;
        self.load_users_in_order(&ids).await
    }

    /// Users with a pending request toward this user, newest first
    pub async fn incoming(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let ids = self.db.get_incoming_request_ids(user_id).await?;
        self.load_users_in_order(&ids).await
    }

    /// Users this user has a pending request toward, newest first
    pub async fn sent(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let ids = self.db.get_sent_request_ids(user_id).await?;
        self.load_users_in_order(&ids).await
    }

    /// Derive the relationship status between two users
    pub async fn status_between(
        &self,
        self_id: &str,
        other_id: &str,
    ) -> Result<FriendStatus, AppError> {
        if self_id == other_id {
            return Ok(FriendStatus::None);
        }

        let status = match self.db.get_friendship(self_id, other_id).await? {
            Some(friendship) => derive_status(self_id, &friendship),
            None => FriendStatus::None,
        };

        Ok(status)
    }

    /// All other users, each labeled with the derived status
    ///
    /// Relationship rows are loaded once for the whole listing.
    pub async fn discover(&self, user_id: &str) -> Result<Vec<(User, FriendStatus)>, AppError> {
        let users = self.db.list_users_except(user_id).await?;
        let friendships = self.db.get_friendships_for(user_id).await?;

        let statuses: HashMap<String, FriendStatus> = friendships
            .iter()
            .map(|friendship| {
                (
                    friendship.other(user_id).to_string(),
                    derive_status(user_id, friendship),
                )
            })
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let status = statuses.get(&user.id).copied().unwrap_or(FriendStatus::None);
                (user, status)
            })
            .collect())
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn ensure_user_exists(&self, user_id: &str) -> Result<(), AppError> {
        if !self.db.user_exists(user_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Resolve user IDs to records, preserving the given order.
    async fn load_users_in_order(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        let mut by_id: HashMap<String, User> = self
            .db
            .get_users_by_ids(ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}

/// Status of `user_id` relative to the pair row.
///
/// The pair model allows at most one row per pair, so the priority order
/// friend > incoming > pending can never actually tie-break; it is
/// preserved here structurally.
fn derive_status(user_id: &str, friendship: &Friendship) -> FriendStatus {
    if friendship.status == FriendshipState::Accepted.as_str() {
        FriendStatus::Friend
    } else if friendship.requested_by == user_id {
        FriendStatus::Pending
    } else {
        FriendStatus::Incoming
    }
}
