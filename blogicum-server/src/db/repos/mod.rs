//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the pool; constructed per request
//! - Missing rows become `DbError::NotFound`
//! - Unique violations become `DbError::Conflict`
//! - Uses transactions for multi-step operations

pub mod users;
pub mod categories;
pub mod locations;
pub mod posts;
pub mod comments;

pub use users::{UserRepo, User, ProfileUpdate};
pub use categories::{CategoryRepo, Category, NewCategory};
pub use locations::{LocationRepo, Location};
pub use posts::{PostRepo, PostRow, PostFeed, PostForm};
pub use comments::{CommentRepo, CommentRow};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} with this {field} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },

    /// A foreign key submitted in a form names no existing row
    #[error("{field} does not reference an existing row")]
    InvalidReference { field: &'static str },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Map a unique-constraint violation to `Conflict`, pass everything else through.
pub(crate) fn conflict_on_unique(
    resource: &'static str,
    field: &'static str,
) -> impl FnOnce(sqlx::Error) -> DbError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DbError::Conflict { resource, field }
        }
        _ => DbError::Sqlx(err),
    }
}
