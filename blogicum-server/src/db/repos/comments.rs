//! Comment repository
//!
//! A comment is always addressed through its post: lookups require both ids
//! to match.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::Body;

/// Comment with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

const COMMENT_SELECT: &str = r#"
    SELECT cm.id, cm.post_id, cm.text, cm.author_id, u.username AS author_username, cm.created_at
    FROM comments cm
    JOIN users u ON u.id = cm.author_id
"#;

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a comment to a post. Any existing post may be commented on.
    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: &Body,
    ) -> Result<CommentRow, DbError> {
        let mut tx = self.pool.begin().await?;

        let (post_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await?;

        if !post_exists {
            return Err(DbError::not_found("post", post_id));
        }

        let comment = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (text, post_id, author_id)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, text, author_id, created_at
            )
            SELECT i.id, i.post_id, i.text, i.author_id, u.username AS author_username, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(text.as_str())
        .bind(post_id)
        .bind(author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Comments of a post, oldest first.
    pub async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentRow>, DbError> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE cm.post_id = $1 ORDER BY cm.created_at ASC"
        ))
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Get a comment that belongs to `post_id`.
    pub async fn get_for_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<CommentRow, DbError> {
        sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE cm.id = $1 AND cm.post_id = $2"
        ))
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("comment", comment_id))
    }

    /// Replace a comment's text.
    pub async fn update_text(&self, comment_id: Uuid, text: &Body) -> Result<CommentRow, DbError> {
        sqlx::query_as::<_, CommentRow>(
            r#"
            WITH updated AS (
                UPDATE comments SET text = $2 WHERE id = $1
                RETURNING id, post_id, text, author_id, created_at
            )
            SELECT d.id, d.post_id, d.text, d.author_id, u.username AS author_username, d.created_at
            FROM updated d
            JOIN users u ON u.id = d.author_id
            "#,
        )
        .bind(comment_id)
        .bind(text.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("comment", comment_id))
    }

    pub async fn delete(&self, comment_id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("comment", comment_id));
        }
        Ok(())
    }
}
