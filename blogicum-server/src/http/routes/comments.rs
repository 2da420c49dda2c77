//! Comment endpoints
//!
//! A comment is addressed through its post. Editing or deleting someone
//! else's comment is forbidden.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{location, post_path};
use crate::db::repos::{CommentRepo, CommentRow};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, CurrentUser, ValidPath};
use crate::http::server::AppState;
use crate::models::Body;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentResponse {
    fn from(c: CommentRow) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            text: c.text,
            author_id: c.author_id,
            author_username: c.author_username,
            created_at: c.created_at,
        }
    }
}

/// Load a comment of `post_id` that `user` wrote.
async fn own_comment(
    state: &AppState,
    user: CurrentUser,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<CommentRow, ApiError> {
    let comment = CommentRepo::new(&state.pool)
        .get_for_post(post_id, comment_id)
        .await?;

    if comment.author_id != user.id {
        return Err(ApiError::Forbidden {
            reason: "only the author may change this comment",
        });
    }
    Ok(comment)
}

/// POST /posts/{post_id}/comment - comment on any existing post
async fn add_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<Response, ApiError> {
    let text = Body::new("text", &req.text)?;
    let comment = CommentRepo::new(&state.pool)
        .create(post_id, user.id, &text)
        .await?;
    tracing::info!(post_id = %post_id, comment_id = %comment.id, user_id = %user.id, "Comment added");

    let headers = location(&post_path(post_id))?;
    Ok((StatusCode::CREATED, headers, Json(CommentResponse::from(comment))).into_response())
}

/// GET /posts/{post_id}/edit_comment/{comment_id} - current text
async fn edit_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath((post_id, comment_id)): ValidPath<(Uuid, Uuid)>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = own_comment(&state, user, post_id, comment_id).await?;
    Ok(Json(CommentResponse::from(comment)))
}

/// PUT /posts/{post_id}/edit_comment/{comment_id}
async fn edit_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath((post_id, comment_id)): ValidPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<Response, ApiError> {
    own_comment(&state, user, post_id, comment_id).await?;

    let text = Body::new("text", &req.text)?;
    let comment = CommentRepo::new(&state.pool)
        .update_text(comment_id, &text)
        .await?;
    tracing::info!(post_id = %post_id, comment_id = %comment_id, user_id = %user.id, "Comment updated");

    let headers = location(&post_path(post_id))?;
    Ok((headers, Json(CommentResponse::from(comment))).into_response())
}

/// GET /posts/{post_id}/delete_comment/{comment_id} - confirmation payload
async fn delete_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath((post_id, comment_id)): ValidPath<(Uuid, Uuid)>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = own_comment(&state, user, post_id, comment_id).await?;
    Ok(Json(CommentResponse::from(comment)))
}

/// DELETE /posts/{post_id}/delete_comment/{comment_id}
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath((post_id, comment_id)): ValidPath<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    own_comment(&state, user, post_id, comment_id).await?;

    CommentRepo::new(&state.pool).delete(comment_id).await?;
    tracing::info!(post_id = %post_id, comment_id = %comment_id, user_id = %user.id, "Comment deleted");

    let headers = location(&post_path(post_id))?;
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

/// Comment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/posts/{post_id}/comment", post(add_comment))
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}",
            get(edit_form).put(edit_comment),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}",
            get(delete_form).delete(delete_comment),
        )
}
