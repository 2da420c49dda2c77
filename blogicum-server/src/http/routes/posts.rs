//! Post endpoints: index feed, detail, create, edit, image upload, delete
//!
//! Only the author may edit or delete a post. Anyone else who tries is sent
//! back to the post with a 303 rather than refused.

use std::sync::Arc;

use axum::{
    body::Body as RequestBody,
    extract::{Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use super::comments::CommentResponse;
use super::{location, post_path, profile_path};
use crate::db::repos::{CommentRepo, PostFeed, PostForm, PostRepo, PostRow};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, CurrentUser, MaybeUser, ValidPath};
use crate::http::server::AppState;
use crate::models::{
    parse_pub_date, Body, ImageKind, PageParams, Paginated, Title, ValidationError,
};

/// Uploaded images live here, relative to the media root.
const IMAGE_DIR: &str = "posts_images";

/// Create/edit post request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub text: String,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    /// RFC 3339 or `YYYY-MM-DDTHH:MM`; blank means now
    pub pub_date: Option<String>,
    pub is_published: Option<bool>,
}

impl PostRequest {
    fn into_form(self, now: DateTime<Utc>) -> Result<PostForm, ValidationError> {
        let title = Title::new("title", &self.title)?;
        let text = Body::new("text", &self.text)?;
        let category_id = self
            .category_id
            .ok_or(ValidationError::Empty { field: "category_id" })?;
        let pub_date = parse_pub_date(self.pub_date.as_deref(), now)?;

        Ok(PostForm {
            title,
            text,
            category_id,
            location_id: self.location_id,
            pub_date,
            is_published: self.is_published.unwrap_or(true),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct LocationRef {
    pub id: Uuid,
    pub name: String,
}

/// Post as shown in feeds and on its own page
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub image_url: Option<String>,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    /// Present only while the location is published
    pub location: Option<LocationRef>,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

fn media_url(image: &str) -> String {
    format!("/media/{}", image)
}

impl From<PostRow> for PostResponse {
    fn from(p: PostRow) -> Self {
        let category = match (p.category_id, p.category_title, p.category_slug) {
            (Some(id), Some(title), Some(slug)) => Some(CategoryRef { id, title, slug }),
            _ => None,
        };
        let location = match (p.location_id, p.location_name, p.location_published) {
            (Some(id), Some(name), Some(true)) => Some(LocationRef { id, name }),
            _ => None,
        };

        Self {
            id: p.id,
            title: p.title,
            text: p.text,
            pub_date: p.pub_date,
            is_published: p.is_published,
            image_url: p.image.as_deref().map(media_url),
            author: AuthorRef {
                id: p.author_id,
                username: p.author_username,
            },
            category,
            location,
            comment_count: p.comment_count,
            created_at: p.created_at,
        }
    }
}

/// Current values of the edit form
#[derive(Debug, Serialize)]
pub struct PostFormResponse {
    pub title: String,
    pub text: String,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub image_url: Option<String>,
}

impl From<PostRow> for PostFormResponse {
    fn from(p: PostRow) -> Self {
        Self {
            title: p.title,
            text: p.text,
            category_id: p.category_id,
            location_id: p.location_id,
            pub_date: p.pub_date,
            is_published: p.is_published,
            image_url: p.image.as_deref().map(media_url),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

fn not_author(post_id: Uuid, user_id: Uuid) -> Response {
    tracing::debug!(post_id = %post_id, user_id = %user_id, "Not the author, redirecting");
    Redirect::to(&post_path(post_id)).into_response()
}

/// GET / - publicly visible posts, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<PostResponse>>, ApiError> {
    let page = PostRepo::new(&state.pool)
        .list(PostFeed::Public, &params)
        .await?;

    Ok(Json(page.map(PostResponse::from)))
}

/// GET /posts/{post_id} - a post visible to the viewer, with its comments
async fn post_detail(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    ValidPath(post_id): ValidPath<Uuid>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if !post.publication().is_visible_to(viewer, Utc::now()) {
        return Err(ApiError::NotFound {
            resource: "post",
            id: post_id.to_string(),
        });
    }

    let comments = CommentRepo::new(&state.pool)
        .list_for_post(post_id)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(Json(PostDetailResponse {
        post: PostResponse::from(post),
        comments,
    }))
}

/// POST /posts/create - publish a post as the current user
async fn create_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(req): ApiJson<PostRequest>,
) -> Result<Response, ApiError> {
    let form = req.into_form(Utc::now())?;
    let post = PostRepo::new(&state.pool).create(user.id, &form).await?;
    tracing::info!(post_id = %post.id, user_id = %user.id, "Post created");

    let headers = location(&profile_path(&post.author_username))?;
    Ok((StatusCode::CREATED, headers, Json(PostResponse::from(post))).into_response())
}

/// GET /posts/{post_id}/edit - current form values
async fn edit_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
) -> Result<Response, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if post.author_id != user.id {
        return Ok(not_author(post_id, user.id));
    }

    Ok(Json(PostFormResponse::from(post)).into_response())
}

/// PUT /posts/{post_id}/edit - replace the form fields
async fn edit_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
    ApiJson(req): ApiJson<PostRequest>,
) -> Result<Response, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(post_id).await?;
    if post.author_id != user.id {
        return Ok(not_author(post_id, user.id));
    }

    let form = req.into_form(Utc::now())?;
    let post = repo.update(post_id, &form).await?;
    tracing::info!(post_id = %post_id, user_id = %user.id, "Post updated");

    let headers = location(&post_path(post_id))?;
    Ok((headers, Json(PostResponse::from(post))).into_response())
}

/// PUT /posts/{post_id}/image - store a raw image body as the post's picture
async fn upload_image(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
    headers: HeaderMap,
    body: RequestBody,
) -> Result<Response, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(post_id).await?;
    if post.author_id != user.id {
        return Ok(not_author(post_id, user.id));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let kind = ImageKind::from_content_type(content_type).ok_or_else(|| {
        ApiError::UnsupportedMediaType {
            content_type: content_type.to_owned(),
        }
    })?;

    let max_bytes = state.media.max_image_bytes;
    let bytes = axum::body::to_bytes(body, max_bytes)
        .await
        .map_err(|_| ApiError::PayloadTooLarge { max_bytes })?;
    if bytes.is_empty() {
        return Err(ValidationError::Empty { field: "image" }.into());
    }

    let relative = format!("{}/{}.{}", IMAGE_DIR, Uuid::new_v4(), kind.extension());
    let path = state.media.root.join(&relative);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| ApiError::internal(format!("create {}: {}", dir.display(), e)))?;
    }
    fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::internal(format!("write {}: {}", path.display(), e)))?;

    let previous = match repo.set_image(post_id, &relative).await {
        Ok(previous) => previous,
        Err(e) => {
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
    };

    if let Some(old) = previous {
        let old_path = state.media.root.join(&old);
        if let Err(e) = fs::remove_file(&old_path).await {
            tracing::warn!(path = %old_path.display(), "Could not remove replaced image: {}", e);
        }
    }

    tracing::info!(post_id = %post_id, user_id = %user.id, bytes = bytes.len(), "Image stored");

    let post = repo.get(post_id).await?;
    let headers = location(&post_path(post_id))?;
    Ok((headers, Json(PostResponse::from(post))).into_response())
}

/// GET /posts/{post_id}/delete - confirmation payload
async fn delete_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
) -> Result<Response, ApiError> {
    let post = PostRepo::new(&state.pool).get(post_id).await?;
    if post.author_id != user.id {
        return Ok(not_author(post_id, user.id));
    }

    Ok(Json(PostResponse::from(post)).into_response())
}

/// DELETE /posts/{post_id}/delete - remove the post and its comments
async fn delete_post(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidPath(post_id): ValidPath<Uuid>,
) -> Result<Response, ApiError> {
    let repo = PostRepo::new(&state.pool);
    let post = repo.get(post_id).await?;
    if post.author_id != user.id {
        return Ok(not_author(post_id, user.id));
    }

    repo.delete(post_id).await?;
    tracing::info!(post_id = %post_id, user_id = %user.id, "Post deleted");

    let headers = location(&profile_path(&post.author_username))?;
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/posts/create", post(create_post))
        .route("/posts/{post_id}", get(post_detail))
        .route("/posts/{post_id}/edit", get(edit_form).put(edit_post))
        .route("/posts/{post_id}/image", put(upload_image))
        .route("/posts/{post_id}/delete", get(delete_form).delete(delete_post))
}
