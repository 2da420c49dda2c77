//! Schema setup for the blog tables
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so this runs on each start.

use sqlx::PgPool;

pub const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            password_hash TEXT NOT NULL,
            date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "categories",
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            slug TEXT NOT NULL UNIQUE,
            is_published BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "locations",
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL,
            is_published BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            text TEXT NOT NULL,
            pub_date TIMESTAMPTZ NOT NULL,
            author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
            location_id UUID REFERENCES locations(id) ON DELETE SET NULL,
            image TEXT,
            is_published BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "comments",
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            text TEXT NOT NULL,
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

pub const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_posts_pub_date ON posts(pub_date DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at)",
];

/// Create all tables and indexes
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running blog migrations...");

    for (name, ddl) in TABLES {
        tracing::debug!(table = name, "ensuring table");
        sqlx::query(ddl).execute(pool).await?;
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    tracing::info!("Blog migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_before_their_references() {
        let order: Vec<&str> = TABLES.iter().map(|(name, _)| *name).collect();
        let pos = |t: &str| order.iter().position(|n| *n == t).unwrap();

        assert!(pos("users") < pos("posts"));
        assert!(pos("categories") < pos("posts"));
        assert!(pos("locations") < pos("posts"));
        assert!(pos("posts") < pos("comments"));
    }

    #[test]
    fn every_statement_is_idempotent() {
        for (_, ddl) in TABLES {
            assert!(ddl.contains("IF NOT EXISTS"));
        }
        for ddl in INDEXES {
            assert!(ddl.contains("IF NOT EXISTS"));
        }
    }
}
