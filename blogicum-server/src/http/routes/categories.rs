//! Category feed

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use super::posts::PostResponse;
use crate::db::repos::{Category, CategoryRepo, PostFeed, PostRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{PageParams, Paginated};

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            slug: c.slug,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryPageResponse {
    pub category: CategoryResponse,
    pub page_obj: Paginated<PostResponse>,
}

/// GET /category/{category_slug} - publicly visible posts of a published category
async fn category_posts(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<CategoryPageResponse>, ApiError> {
    let category = CategoryRepo::new(&state.pool).get_published(&slug).await?;
    let page = PostRepo::new(&state.pool)
        .list(PostFeed::Category(category.id), &params)
        .await?;

    Ok(Json(CategoryPageResponse {
        category: CategoryResponse::from(category),
        page_obj: page.map(PostResponse::from),
    }))
}

/// Category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/category/{category_slug}", get(category_posts))
}
