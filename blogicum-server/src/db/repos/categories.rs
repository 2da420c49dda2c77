//! Category repository
//!
//! Categories are administered from the CLI; the HTTP side only reads them.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, DbError};
use crate::models::{CategorySlug, Title};

/// Category record from database
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new category
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub title: Title,
    pub description: String,
    pub slug: CategorySlug,
    pub is_published: bool,
}

/// Category repository
pub struct CategoryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category. A taken slug is a conflict.
    pub async fn create(&self, new: &NewCategory) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (title, description, slug, is_published)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(new.title.as_str())
        .bind(&new.description)
        .bind(new.slug.as_str())
        .bind(new.is_published)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("category", "slug"))
    }

    /// All categories, newest first.
    pub async fn list(&self) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a published category by slug. Unpublished categories are not found.
    pub async fn get_published(&self, slug: &str) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, title, description, slug, is_published, created_at
            FROM categories
            WHERE slug = $1 AND is_published
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }

    /// Publish or hide a category by slug.
    pub async fn set_published(&self, slug: &str, is_published: bool) -> Result<Category, DbError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET is_published = $2
            WHERE slug = $1
            RETURNING id, title, description, slug, is_published, created_at
            "#,
        )
        .bind(slug)
        .bind(is_published)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("category", slug))
    }
}
