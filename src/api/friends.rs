//! Friend graph endpoints

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, post},
};

use crate::AppState;
use crate::api::converters::user_to_response;
use crate::api::dto::{RelationshipResponse, UserResponse};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{FRIEND_REQUEST_ACTIONS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::service::FriendService;

fn build_friend_service(state: &AppState) -> FriendService {
    FriendService::new(state.db.clone())
}

/// POST /friends/:id — send a friend request
pub async fn send_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(to_id): Path<String>,
) -> Result<Json<RelationshipResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/friends/:id"])
        .start_timer();

    let status = build_friend_service(&state)
        .send_request(&user.id, &to_id)
        .await?;

    FRIEND_REQUEST_ACTIONS_TOTAL.with_label_values(&["sent"]).inc();

    Ok(Json(RelationshipResponse { id: to_id, status }))
}

/// POST /friends/accept/:id — accept a pending request
pub async fn accept_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(requester_id): Path<String>,
) -> Result<Json<RelationshipResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/friends/accept/:id"])
        .start_timer();

    let status = build_friend_service(&state)
        .accept_request(&user.id, &requester_id)
        .await?;

    FRIEND_REQUEST_ACTIONS_TOTAL
        .with_label_values(&["accepted"])
        .inc();

    Ok(Json(RelationshipResponse {
        id: requester_id,
        status,
    }))
}

/// POST /friends/decline/:id (alias: /friends/reject/:id)
pub async fn decline_friend_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(requester_id): Path<String>,
) -> Result<Json<RelationshipResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/friends/decline/:id"])
        .start_timer();

    let status = build_friend_service(&state)
        .decline_request(&user.id, &requester_id)
        .await?;

    FRIEND_REQUEST_ACTIONS_TOTAL
        .with_label_values(&["declined"])
        .inc();

    Ok(Json(RelationshipResponse {
        id: requester_id,
        status,
    }))
}

/// GET /friends — caller's friend list
pub async fn get_friends(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let friends = build_friend_service(&state).friends(&user.id).await?;

    Ok(Json(
        friends
            .iter()
            .map(|friend| user_to_response(friend, None))
            .collect(),
    ))
}

/// GET /friends/requests — incoming pending requests
pub async fn get_friend_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let requesters = build_friend_service(&state).incoming(&user.id).await?;

    Ok(Json(
        requesters
            .iter()
            .map(|requester| user_to_response(requester, None))
            .collect(),
    ))
}

/// GET /friends/sent — outgoing pending requests
pub async fn get_sent_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let targets = build_friend_service(&state).sent(&user.id).await?;

    Ok(Json(
        targets
            .iter()
            .map(|target| user_to_response(target, None))
            .collect(),
    ))
}

/// Create friends router
pub fn friends_router() -> Router<AppState> {
    Router::new()
        .route("/friends", get(get_friends))
        .route("/friends/requests", get(get_friend_requests))
        .route("/friends/sent", get(get_sent_requests))
        .route("/friends/accept/:id", post(accept_friend_request))
        .route("/friends/decline/:id", post(decline_friend_request))
        .route("/friends/reject/:id", post(decline_friend_request))
        .route("/friends/:id", post(send_friend_request))
}
