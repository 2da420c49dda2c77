//! User repository
//!
//! Usernames are unique by constraint; clashes surface as `DbError::Conflict`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{conflict_on_unique, DbError};
use crate::models::{Email, PersonName, Username};

/// User record from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last", or the username when neither is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_owned()
        }
    }
}

/// Validated profile fields
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub username: Username,
    pub email: Email,
}

const USER_COLUMNS: &str =
    "id, username, first_name, last_name, email, password_hash, date_joined";

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a user with an already-hashed password.
    pub async fn create(&self, username: &Username, password_hash: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("user", "username"))
    }

    /// Get a user by id.
    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Look up a user by username, if any.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<User, DbError> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| DbError::not_found("user", username))
    }

    /// Overwrite the editable profile fields.
    pub async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, username = $4, email = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.first_name.as_str())
        .bind(update.last_name.as_str())
        .bind(update.username.as_str())
        .bind(update.email.as_str())
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique("user", "username"))?
        .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Replace the stored password hash.
    pub async fn set_password(&self, id: Uuid, password_hash: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", id));
        }
        Ok(())
    }
}
