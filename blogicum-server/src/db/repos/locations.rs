//! Location repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::Title;

/// Location record from database
#[derive(Debug, Clone, FromRow)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Location repository
pub struct LocationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> LocationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &Title, is_published: bool) -> Result<Location, DbError> {
        let location = sqlx::query_as::<_, Location>(
            r#"
            INSERT INTO locations (name, is_published)
            VALUES ($1, $2)
            RETURNING id, name, is_published, created_at
            "#,
        )
        .bind(name.as_str())
        .bind(is_published)
        .fetch_one(self.pool)
        .await?;

        Ok(location)
    }

    /// All locations, alphabetical.
    pub async fn list(&self) -> Result<Vec<Location>, DbError> {
        let rows = sqlx::query_as::<_, Location>(
            "SELECT id, name, is_published, created_at FROM locations ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
