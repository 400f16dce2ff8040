//! Comment endpoints

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::{get, patch, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::api::converters::{auth_user_to_author, comment_node_to_response, comment_to_response};
use crate::api::dto::{CommentResponse, DeletedResponse, LikeResponse};
use crate::auth::CurrentUser;
use crate::data::CommentTarget;
use crate::error::AppError;
use crate::metrics::{COMMENTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::CommentService;

/// Comment creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub text: Option<String>,
    pub post_id: Option<String>,
    pub video_id: Option<String>,
    pub parent_id: Option<String>,
}

fn build_comment_service(state: &AppState) -> CommentService {
    CommentService::new(state.db.clone(), state.config.limits.comment_max_chars)
}

/// POST /comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/comments"])
        .start_timer();

    let service = build_comment_service(&state);
    let comment = service
        .create(
            &user.id,
            req.text.unwrap_or_default(),
            req.post_id,
            req.video_id,
            req.parent_id,
        )
        .await?;

    COMMENTS_TOTAL.inc();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/comments", "200"])
        .inc();

    // A fresh comment has no likes and no replies yet.
    let response = comment_to_response(&comment, auth_user_to_author(&user), vec![], vec![]);

    Ok(Json(response))
}

/// GET /comments/:id — reply tree for a video
pub async fn get_video_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/comments/:id"])
        .start_timer();

    let tree = build_comment_service(&state)
        .tree(&CommentTarget::Video(video_id))
        .await?;

    Ok(Json(tree.into_iter().map(comment_node_to_response).collect()))
}

/// GET /comments/post/:post_id — reply tree for a post
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/comments/post/:post_id"])
        .start_timer();

    let tree = build_comment_service(&state)
        .tree(&CommentTarget::Post(post_id))
        .await?;

    Ok(Json(tree.into_iter().map(comment_node_to_response).collect()))
}

/// DELETE /comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["DELETE", "/comments/:id"])
        .start_timer();

    let comment = build_comment_service(&state)
        .delete(&comment_id, &user.id)
        .await?;

    COMMENTS_TOTAL.dec();
    tracing::info!(comment_id = %comment.id, author = %user.id, "Comment deleted");

    Ok(Json(DeletedResponse {
        id: comment.id,
        deleted: true,
    }))
}

/// PATCH /comments/:id/like
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<LikeResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["PATCH", "/comments/:id/like"])
        .start_timer();

    let (likes, liked) = build_comment_service(&state)
        .toggle_like(&comment_id, &user.id)
        .await?;

    Ok(Json(LikeResponse { likes, liked }))
}

/// Create comments router
///
/// The two tree fetchers are public; everything else authenticates via
/// the `CurrentUser` extractor.
pub fn comments_router() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment))
        .route("/comments/post/:post_id", get(get_post_comments))
        .route(
            "/comments/:id",
            get(get_video_comments).delete(delete_comment),
        )
        .route("/comments/:id/like", patch(toggle_comment_like))
}
