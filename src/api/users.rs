//! User discovery endpoints

use axum::{Router, extract::State, response::Json, routing::get};

use crate::AppState;
use crate::api::converters::user_to_response;
use crate::api::dto::UserResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::HTTP_REQUEST_DURATION_SECONDS;
use crate::service::FriendService;

/// GET /users — all users except the caller
///
/// Each entry carries the derived relationship status so the client can
/// label its add-friend buttons without extra round trips.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/users"])
        .start_timer();

    let listing = FriendService::new(state.db.clone()).discover(&user.id).await?;

    Ok(Json(
        listing
            .iter()
            .map(|(other, status)| user_to_response(other, Some(*status)))
            .collect(),
    ))
}

/// Create users router
pub fn users_router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}
