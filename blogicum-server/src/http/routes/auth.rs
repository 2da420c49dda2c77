//! Registration, login, logout and password change

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use super::location;
use super::profiles::ProfileResponse;
use crate::auth::{hash_password, reject_unknown_user, verify_password, AuthError, SESSION_COOKIE};
use crate::db::repos::UserRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, CurrentUser};
use crate::http::server::AppState;
use crate::models::{NewPassword, Username, ValidationError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationRequest {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: ProfileResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordChangeRequest {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

/// Argon2 is CPU-bound; keep it off the async workers.
async fn off_runtime<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("password task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// POST /auth/registration
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegistrationRequest>,
) -> Result<Response, ApiError> {
    let username = Username::new(&req.username)?;
    let password = NewPassword::new(&req.password1, &req.password2, username.as_str())?;
    let hash = off_runtime(move || hash_password(&password)).await?;

    let user = UserRepo::new(&state.pool).create(&username, &hash).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let headers = location("/")?;
    Ok((StatusCode::CREATED, headers, Json(ProfileResponse::own(user))).into_response())
}

/// POST /auth/login - issue a session token and set the session cookie
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let found = UserRepo::new(&state.pool)
        .find_by_username(req.username.trim())
        .await?;

    let password = req.password;
    let Some(user) = found else {
        off_runtime(move || reject_unknown_user(&password)).await?;
        return Err(AuthError::InvalidCredentials.into());
    };

    let stored = user.password_hash.clone();
    off_runtime(move || verify_password(&password, &stored)).await?;

    let token = state.sessions.issue(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            expires_in: state.sessions.ttl_seconds(),
            user: ProfileResponse::own(user),
        }),
    ))
}

/// POST /auth/logout - drop the session cookie
async fn logout(jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
    )
}

/// POST /auth/password_change
async fn password_change(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    ApiJson(req): ApiJson<PasswordChangeRequest>,
) -> Result<StatusCode, ApiError> {
    let users = UserRepo::new(&state.pool);
    let user = users.get(current.id).await?;

    let old = req.old_password;
    let stored = user.password_hash.clone();
    match off_runtime(move || verify_password(&old, &stored)).await {
        Ok(()) => {}
        Err(ApiError::Unauthorized { .. }) => {
            return Err(ValidationError::InvalidFormat {
                field: "old_password",
                reason: "your old password was entered incorrectly",
            }
            .into());
        }
        Err(e) => return Err(e),
    }

    let password = NewPassword::new(&req.new_password1, &req.new_password2, &user.username)?;
    let hash = off_runtime(move || hash_password(&password)).await?;
    users.set_password(user.id, &hash).await?;
    tracing::info!(user_id = %user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/registration", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password_change", post(password_change))
}
