//! Post repository
//!
//! Every read joins author, category and location and counts comments in the
//! same statement, so listings cost one count query plus one page query.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::DbError;
use crate::models::{Body, PageParams, Paginated, Publication, Title};

/// Post joined with its relations, as listed and displayed
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_username: String,
    pub category_id: Option<Uuid>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_published: Option<bool>,
    pub location_id: Option<Uuid>,
    pub location_name: Option<String>,
    pub location_published: Option<bool>,
    pub comment_count: i64,
}

impl PostRow {
    pub fn publication(&self) -> Publication {
        Publication {
            author_id: self.author_id,
            is_published: self.is_published,
            pub_date: self.pub_date,
            category_published: self.category_published,
        }
    }
}

/// Which posts a listing shows
#[derive(Debug, Clone, Copy)]
pub enum PostFeed {
    /// Publicly visible posts (the index)
    Public,
    /// Publicly visible posts of one category
    Category(Uuid),
    /// One author's posts. `include_hidden` is set when the author is looking;
    /// otherwise only published, due posts are listed.
    Author { author_id: Uuid, include_hidden: bool },
}

/// Validated post form
#[derive(Debug, Clone)]
pub struct PostForm {
    pub title: Title,
    pub text: Body,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
}

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.text, p.pub_date, p.image, p.is_published, p.created_at,
        p.author_id, u.username AS author_username,
        p.category_id, c.title AS category_title, c.slug AS category_slug,
        c.is_published AS category_published,
        p.location_id, l.name AS location_name, l.is_published AS location_published,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const POST_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// Append the WHERE clause for `feed`, evaluated at `now`.
fn push_feed_filter(qb: &mut QueryBuilder<'_, Postgres>, feed: PostFeed, now: DateTime<Utc>) {
    match feed {
        PostFeed::Public => {
            qb.push(" WHERE p.is_published AND c.is_published AND p.pub_date <= ")
                .push_bind(now);
        }
        PostFeed::Category(category_id) => {
            qb.push(" WHERE p.category_id = ")
                .push_bind(category_id)
                .push(" AND p.is_published AND c.is_published AND p.pub_date <= ")
                .push_bind(now);
        }
        PostFeed::Author {
            author_id,
            include_hidden: true,
        } => {
            qb.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        PostFeed::Author {
            author_id,
            include_hidden: false,
        } => {
            qb.push(" WHERE p.author_id = ")
                .push_bind(author_id)
                .push(" AND p.is_published AND p.pub_date <= ")
                .push_bind(now);
        }
    }
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a feed, newest publication date first, one page at a time.
    pub async fn list(
        &self,
        feed: PostFeed,
        params: &PageParams,
    ) -> Result<Paginated<PostRow>, DbError> {
        let now = Utc::now();

        let mut count = QueryBuilder::<Postgres>::new(POST_COUNT);
        push_feed_filter(&mut count, feed, now);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let window = params.resolve(total);

        let mut page = QueryBuilder::<Postgres>::new(POST_SELECT);
        push_feed_filter(&mut page, feed, now);
        page.push(" ORDER BY p.pub_date DESC, p.created_at DESC LIMIT ")
            .push_bind(window.limit())
            .push(" OFFSET ")
            .push_bind(window.offset());

        let items = page
            .build_query_as::<PostRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(items, total, window))
    }

    /// Get a single post by id regardless of visibility.
    pub async fn get(&self, id: Uuid) -> Result<PostRow, DbError> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))
    }

    /// Create a post for `author_id`.
    ///
    /// Category and location are checked inside the transaction so a bad id
    /// is reported as a form error rather than a constraint failure.
    pub async fn create(&self, author_id: Uuid, form: &PostForm) -> Result<PostRow, DbError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, form).await?;

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(form.title.as_str())
        .bind(form.text.as_str())
        .bind(form.pub_date)
        .bind(author_id)
        .bind(form.category_id)
        .bind(form.location_id)
        .bind(form.is_published)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    /// Overwrite a post's form fields. Author, image and timestamps are kept.
    pub async fn update(&self, id: Uuid, form: &PostForm) -> Result<PostRow, DbError> {
        let mut tx = self.pool.begin().await?;
        check_references(&mut tx, form).await?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, text = $3, pub_date = $4, category_id = $5,
                location_id = $6, is_published = $7
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(form.title.as_str())
        .bind(form.text.as_str())
        .bind(form.pub_date)
        .bind(form.category_id)
        .bind(form.location_id)
        .bind(form.is_published)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Point the post at a new image file, returning the previous path.
    pub async fn set_image(&self, id: Uuid, image: &str) -> Result<Option<String>, DbError> {
        let mut tx = self.pool.begin().await?;

        let (previous,): (Option<String>,) =
            sqlx::query_as("SELECT image FROM posts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("post", id))?;

        sqlx::query("UPDATE posts SET image = $2 WHERE id = $1")
            .bind(id)
            .bind(image)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    /// Delete a post; its comments go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        Ok(())
    }
}

async fn check_references(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    form: &PostForm,
) -> Result<(), DbError> {
    let (category_exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
            .bind(form.category_id)
            .fetch_one(&mut **tx)
            .await?;

    if !category_exists {
        return Err(DbError::InvalidReference {
            field: "category_id",
        });
    }

    if let Some(location_id) = form.location_id {
        let (location_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
                .bind(location_id)
                .fetch_one(&mut **tx)
                .await?;

        if !location_exists {
            return Err(DbError::InvalidReference {
                field: "location_id",
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(feed: PostFeed) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM posts p");
        push_feed_filter(&mut qb, feed, Utc::now());
        qb.sql().to_owned()
    }

    #[test]
    fn public_feed_requires_published_category() {
        let sql = sql_for(PostFeed::Public);
        assert!(sql.contains("p.is_published"));
        assert!(sql.contains("c.is_published"));
        assert!(sql.contains("p.pub_date <= $1"));
    }

    #[test]
    fn category_feed_binds_category_first() {
        let sql = sql_for(PostFeed::Category(Uuid::new_v4()));
        assert!(sql.contains("p.category_id = $1"));
        assert!(sql.contains("p.pub_date <= $2"));
    }

    #[test]
    fn owner_sees_everything() {
        let sql = sql_for(PostFeed::Author {
            author_id: Uuid::new_v4(),
            include_hidden: true,
        });
        assert!(sql.ends_with("WHERE p.author_id = $1"));
    }

    #[test]
    fn visitor_profile_ignores_category_publication() {
        let sql = sql_for(PostFeed::Author {
            author_id: Uuid::new_v4(),
            include_hidden: false,
        });
        assert!(sql.contains("p.is_published"));
        assert!(sql.contains("p.pub_date <= $2"));
        assert!(!sql.contains("c.is_published"));
    }
}
