//! SQLite database operations
//!
//! All database access goes through this module.
//! Mutations that carry state-machine invariants (friend requests,
//! like toggles) are single conditional statements or short transactions,
//! so concurrent requests cannot observe partial updates.

use sqlx::{Pool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

const ACCESS_TOKEN_HASH_PREFIX: &str = "sha256:";

/// Digest an access token for at-rest storage and lookup.
///
/// Plaintext tokens never touch the database.
fn hash_access_token(access_token: &str) -> String {
    let digest = Sha256::digest(access_token.as_bytes());
    format!(
        "{}{}",
        ACCESS_TOKEN_HASH_PREFIX,
        URL_SAFE_NO_PAD.encode(digest)
    )
}

/// Normalize a user pair to its canonical (lo, hi) storage order.
fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert or update a user record
    ///
    /// Provisioning entry point for the external auth collaborator.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, display_name, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET username = excluded.username,
                                           display_name = excluded.display_name",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get user by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, display_name, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether a user exists
    pub async fn user_exists(&self, id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Get users among the provided IDs
    ///
    /// Returned in no particular order; callers preserve their own ordering.
    pub async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, username, display_name, created_at FROM users WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        query.push(")");

        let users = query
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// List all users except the given one (discovery listing)
    pub async fn list_users_except(&self, user_id: &str) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, display_name, created_at FROM users
             WHERE id != ? ORDER BY username ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    // =========================================================================
    // Auth tokens
    // =========================================================================

    /// Store an access token for a user
    ///
    /// The token is hashed before storage.
    pub async fn insert_auth_token(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<(), AppError> {
        let id = EntityId::new().0;
        sqlx::query(
            "INSERT INTO auth_tokens (id, user_id, access_token, revoked, created_at)
             VALUES (?, ?, ?, 0, datetime('now'))",
        )
        .bind(&id)
        .bind(user_id)
        .bind(hash_access_token(access_token))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Resolve an access token to its user
    ///
    /// Returns None for unknown or revoked tokens.
    pub async fn get_user_by_access_token(
        &self,
        access_token: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.display_name, u.created_at
             FROM users u
             JOIN auth_tokens t ON t.user_id = u.id
             WHERE t.access_token = ? AND t.revoked = 0",
        )
        .bind(hash_access_token(access_token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Revoke an access token
    pub async fn revoke_auth_token(&self, access_token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE auth_tokens SET revoked = 1 WHERE access_token = ?")
            .bind(hash_access_token(access_token))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Insert a comment record
    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO comments (id, author_id, content, post_id, video_id, parent_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&comment.id)
        .bind(&comment.author_id)
        .bind(&comment.content)
        .bind(&comment.post_id)
        .bind(&comment.video_id)
        .bind(&comment.parent_id)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get comment by ID
    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "SELECT id, author_id, content, post_id, video_id, parent_id, created_at
             FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete a single comment record and its like rows
    ///
    /// Children are deliberately left in place; the tree builder promotes
    /// them to top level on the next fetch.
    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comment_likes WHERE comment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get all comments for a target, newest first
    ///
    /// Replies are included in the same flat result; the fetch order is
    /// preserved into the assembled tree.
    pub async fn get_comments_by_target(
        &self,
        target: &CommentTarget,
    ) -> Result<Vec<Comment>, AppError> {
        let (sql, id) = match target {
            CommentTarget::Post(post_id) => (
                "SELECT id, author_id, content, post_id, video_id, parent_id, created_at
                 FROM comments WHERE post_id = ? ORDER BY created_at DESC",
                post_id,
            ),
            CommentTarget::Video(video_id) => (
                "SELECT id, author_id, content, post_id, video_id, parent_id, created_at
                 FROM comments WHERE video_id = ? ORDER BY created_at DESC",
                video_id,
            ),
        };

        let comments = sqlx::query_as::<_, Comment>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }

    /// Toggle a user's like on a comment
    ///
    /// One transaction: conditional delete, insert only if nothing was
    /// deleted. Returns the resulting like count and liked flag.
    pub async fn toggle_comment_like(
        &self,
        comment_id: &str,
        user_id: &str,
    ) -> Result<(i64, bool), AppError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM comment_likes WHERE comment_id = ? AND user_id = ?")
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let liked = if removed == 0 {
            sqlx::query(
                "INSERT INTO comment_likes (comment_id, user_id, created_at)
                 VALUES (?, ?, datetime('now'))",
            )
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        } else {
            false
        };

        let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = ?")
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((likes, liked))
    }

    /// Get liker user IDs for each of the provided comments
    pub async fn get_comment_like_map(
        &self,
        comment_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, AppError> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        if comment_ids.is_empty() {
            return Ok(map);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT comment_id, user_id FROM comment_likes WHERE comment_id IN (",
        );
        let mut separated = query.separated(", ");
        for id in comment_ids {
            separated.push_bind(id);
        }
        query.push(") ORDER BY created_at ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        for row in rows {
            let comment_id: String = row.get("comment_id");
            let user_id: String = row.get("user_id");
            map.entry(comment_id).or_default().push(user_id);
        }

        Ok(map)
    }

    // =========================================================================
    // Friendships
    // =========================================================================

    /// Create a pending friend request edge
    ///
    /// Returns false if any relationship row already exists for the pair
    /// (pending in either direction, or already friends).
    pub async fn insert_friend_request(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<bool, AppError> {
        let (lo, hi) = ordered_pair(from_id, to_id);
        let inserted = sqlx::query(
            "INSERT INTO friendships (user_lo, user_hi, status, requested_by, created_at, updated_at)
             VALUES (?, ?, 'pending', ?, datetime('now'), datetime('now'))
             ON CONFLICT(user_lo, user_hi) DO NOTHING",
        )
        .bind(lo)
        .bind(hi)
        .bind(from_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    /// Promote a pending request to an accepted friendship
    ///
    /// Conditional on the pending row existing with the expected direction;
    /// returns false if no such request was pending. All derived views
    /// (both friend lists, both pending sets) flip with this single write.
    pub async fn accept_friend_request(
        &self,
        user_id: &str,
        requester_id: &str,
    ) -> Result<bool, AppError> {
        let (lo, hi) = ordered_pair(user_id, requester_id);
        let updated = sqlx::query(
            "UPDATE friendships SET status = 'accepted', updated_at = datetime('now')
             WHERE user_lo = ? AND user_hi = ? AND status = 'pending' AND requested_by = ?",
        )
        .bind(lo)
        .bind(hi)
        .bind(requester_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    /// Remove a pending request without creating a friendship
    ///
    /// Returns false if no matching pending request existed.
    pub async fn delete_friend_request(
        &self,
        user_id: &str,
        requester_id: &str,
    ) -> Result<bool, AppError> {
        let (lo, hi) = ordered_pair(user_id, requester_id);
        let deleted = sqlx::query(
            "DELETE FROM friendships
             WHERE user_lo = ? AND user_hi = ? AND status = 'pending' AND requested_by = ?",
        )
        .bind(lo)
        .bind(hi)
        .bind(requester_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted > 0)
    }

    /// Get the relationship row for a user pair, if any
    pub async fn get_friendship(
        &self,
        a: &str,
        b: &str,
    ) -> Result<Option<Friendship>, AppError> {
        let (lo, hi) = ordered_pair(a, b);
        let friendship = sqlx::query_as::<_, Friendship>(
            "SELECT user_lo, user_hi, status, requested_by, created_at, updated_at
             FROM friendships WHERE user_lo = ? AND user_hi = ?",
        )
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    /// Get all relationship rows involving a user
    pub async fn get_friendships_for(&self, user_id: &str) -> Result<Vec<Friendship>, AppError> {
        let friendships = sqlx::query_as::<_, Friendship>(
            "SELECT user_lo, user_hi, status, requested_by, created_at, updated_at
             FROM friendships WHERE user_lo = ? OR user_hi = ?",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friendships)
    }

    /// Get confirmed friend IDs for a user, newest edge first
    pub async fn get_friend_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT CASE WHEN user_lo = ? THEN user_hi ELSE user_lo END
             FROM friendships
             WHERE status = 'accepted' AND (user_lo = ? OR user_hi = ?)
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Get IDs of users with a pending request toward this user, newest first
    pub async fn get_incoming_request_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT requested_by FROM friendships
             WHERE status = 'pending' AND requested_by != ? AND (user_lo = ? OR user_hi = ?)
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Get IDs of users this user has a pending request toward, newest first
    pub async fn get_sent_request_ids(&self, user_id: &str) -> Result<Vec<String>, AppError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT CASE WHEN user_lo = ? THEN user_hi ELSE user_lo END
             FROM friendships
             WHERE status = 'pending' AND requested_by = ?
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
