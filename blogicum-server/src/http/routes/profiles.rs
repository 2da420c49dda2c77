//! Profile pages and profile editing

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::posts::PostResponse;
use super::{location, profile_path};
use crate::db::repos::{PostFeed, PostRepo, ProfileUpdate, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, CurrentUser, MaybeUser};
use crate::http::server::AppState;
use crate::models::{Email, PageParams, Paginated, PersonName, Username, ValidationError};

/// Public view of a user. `email` is only filled in for the user themselves.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn public(user: User) -> Self {
        Self::build(user, false)
    }

    pub fn own(user: User) -> Self {
        Self::build(user, true)
    }

    fn build(user: User, with_email: bool) -> Self {
        let display_name = user.display_name();
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            display_name,
            email: with_email.then_some(user.email),
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfilePageResponse {
    pub profile: ProfileResponse,
    pub page_obj: Paginated<PostResponse>,
}

/// Edit-profile form
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

impl ProfileForm {
    fn validate(&self) -> Result<ProfileUpdate, ValidationError> {
        Ok(ProfileUpdate {
            first_name: PersonName::new("first_name", &self.first_name)?,
            last_name: PersonName::new("last_name", &self.last_name)?,
            username: Username::new(&self.username)?,
            email: Email::new(&self.email)?,
        })
    }
}

impl From<User> for ProfileForm {
    fn from(u: User) -> Self {
        Self {
            first_name: u.first_name,
            last_name: u.last_name,
            username: u.username,
            email: u.email,
        }
    }
}

/// GET /profile/{username} - a user's posts. The owner also sees hidden and
/// deferred ones.
async fn profile(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProfilePageResponse>, ApiError> {
    let user = UserRepo::new(&state.pool).get_by_username(&username).await?;
    let is_owner = viewer == Some(user.id);

    let feed = PostFeed::Author {
        author_id: user.id,
        include_hidden: is_owner,
    };
    let page = PostRepo::new(&state.pool).list(feed, &params).await?;

    let profile = if is_owner {
        ProfileResponse::own(user)
    } else {
        ProfileResponse::public(user)
    };

    Ok(Json(ProfilePageResponse {
        profile,
        page_obj: page.map(PostResponse::from),
    }))
}

/// GET /edit_profile - current form values
async fn edit_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ProfileForm>, ApiError> {
    let user = UserRepo::new(&state.pool).get(user.id).await?;
    Ok(Json(ProfileForm::from(user)))
}

/// PUT /edit_profile
async fn edit_profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiJson(form): ApiJson<ProfileForm>,
) -> Result<Response, ApiError> {
    let update = form.validate()?;
    let updated = UserRepo::new(&state.pool)
        .update_profile(user.id, &update)
        .await?;
    tracing::info!(user_id = %user.id, username = %updated.username, "Profile updated");

    let headers = location(&profile_path(&updated.username))?;
    Ok((headers, Json(ProfileResponse::own(updated))).into_response())
}

/// Profile routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile/{username}", get(profile))
        .route("/edit_profile", get(edit_form).put(edit_profile))
}
