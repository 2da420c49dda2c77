//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::SESSION_COOKIE;

/// Session token from `Authorization: Bearer`, falling back to the cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_owned())
    })
}

/// The signed-in user. Rejects with 401 when there is no valid session.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or_else(ApiError::login_required)?;
        let id = state.sessions.verify(&token)?;
        Ok(Self { id })
    }
}

/// The signed-in user, if any. A bad or expired token counts as anonymous.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let id = session_token(parts).and_then(|token| state.sessions.verify(&token).ok());
        Ok(Self(id))
    }
}

/// Path parameters that must parse (ids as UUIDs). Anything else is a 404,
/// since no such page exists.
pub struct ValidPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound {
                resource: "page",
                id: parts.uri.path().to_owned(),
            })?;

        Ok(Self(value))
    }
}

/// JSON request body. Any rejection (bad syntax, wrong field types, missing
/// `Content-Type`) becomes a JSON 400 instead of axum's plain-text reply.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Claims, SessionKeys};
    use crate::http::server::MediaSettings;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Deserialize;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_is_read() {
        let p = parts(Request::builder().header(AUTHORIZATION, "Bearer abc.def"));
        assert_eq!(session_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn cookie_token_is_read() {
        let p = parts(Request::builder().header("cookie", "other=1; blogicum_session=tok"));
        assert_eq!(session_token(&p).as_deref(), Some("tok"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let p = parts(
            Request::builder()
                .header(AUTHORIZATION, "Bearer from-header")
                .header("cookie", "blogicum_session=from-cookie"),
        );
        assert_eq!(session_token(&p).as_deref(), Some("from-header"));
    }

    #[test]
    fn no_token() {
        let p = parts(Request::builder().header(AUTHORIZATION, "Basic dXNlcjpwdw=="));
        assert_eq!(session_token(&p), None);
    }

    fn state() -> Arc<AppState> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/blogicum_test")
            .unwrap();
        Arc::new(AppState {
            pool,
            sessions: SessionKeys::new("test-secret", 1),
            media: MediaSettings {
                root: std::env::temp_dir(),
                max_image_bytes: 1024,
            },
        })
    }

    async fn maybe_user(state: &Arc<AppState>, token: &str) -> Option<Uuid> {
        let mut p = parts(Request::builder().header(AUTHORIZATION, format!("Bearer {}", token)));
        match MaybeUser::from_request_parts(&mut p, state).await {
            Ok(MaybeUser(id)) => id,
            Err(never) => match never {},
        }
    }

    #[tokio::test]
    async fn maybe_user_reads_valid_token() {
        let state = state();
        let user_id = Uuid::new_v4();
        let token = state.sessions.issue(user_id).unwrap();
        assert_eq!(maybe_user(&state, &token).await, Some(user_id));
    }

    #[tokio::test]
    async fn maybe_user_treats_garbage_token_as_anonymous() {
        let state = state();
        assert_eq!(maybe_user(&state, "not.a.token").await, None);
    }

    #[tokio::test]
    async fn maybe_user_treats_expired_token_as_anonymous() {
        let state = state();
        let past = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: past.timestamp(),
            exp: (past + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(maybe_user(&state, &token).await, None);
    }

    #[derive(Debug, Deserialize)]
    struct Form {
        id: Uuid,
    }

    async fn api_json(content_type: Option<&str>, body: &str) -> Result<Form, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let req = builder.body(Body::from(body.to_owned())).unwrap();
        ApiJson::<Form>::from_request(req, &()).await.map(|ApiJson(form)| form)
    }

    #[tokio::test]
    async fn api_json_accepts_well_formed_body() {
        let id = Uuid::new_v4();
        let form = api_json(Some("application/json"), &format!(r#"{{"id": "{}"}}"#, id))
            .await
            .unwrap();
        assert_eq!(form.id, id);
    }

    #[tokio::test]
    async fn api_json_rejections_are_400() {
        for (content_type, body) in [
            (Some("application/json"), r#"{"id": "not-a-uuid"}"#),
            (Some("application/json"), r#"{"id": "#),
            (None, r#"{"id": "not-a-uuid"}"#),
        ] {
            let err = api_json(content_type, body).await.unwrap_err();
            assert!(matches!(err, ApiError::BadRequest { .. }), "{}", body);
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }
}
