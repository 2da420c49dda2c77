//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Uploaded images served under `/media`
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use blogicum_core::BlogConfig;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::SessionKeys;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
        }
    }
}

impl From<&BlogConfig> for ServerConfig {
    fn from(config: &BlogConfig) -> Self {
        Self {
            bind_addr: config.server.bind,
            cors_permissive: config.server.cors_permissive,
        }
    }
}

/// Where uploaded images live and how large they may be
#[derive(Debug, Clone)]
pub struct MediaSettings {
    pub root: PathBuf,
    pub max_image_bytes: usize,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionKeys,
    pub media: MediaSettings,
}

impl AppState {
    /// Assemble state from a loaded config. Fails when no session secret is set.
    pub fn from_config(pool: PgPool, config: &BlogConfig) -> blogicum_core::Result<Self> {
        let secret = config.require_secret()?;
        Ok(Self {
            pool,
            sessions: SessionKeys::new(secret, config.auth.session_hours),
            media: MediaSettings {
                root: config.media.root.clone(),
                max_image_bytes: config.media.max_image_bytes,
            },
        })
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:8000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let media = ServeDir::new(&state.media.root);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::posts::router())
        .merge(routes::categories::router())
        .merge(routes::comments::router())
        .merge(routes::profiles::router())
        .merge(routes::auth::router())
        .nest_service("/media", media)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = blogicum_server::db::connect(&config.database).await?;
/// let state = AppState::from_config(pool, &config)?;
/// run_server(state, ServerConfig::from(&config)).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(media_root = %state.media.root.display(), "Media directory");
    let app = build_router(state, config.cors_permissive);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
    }

    #[test]
    fn config_from_blog_config() {
        let mut blog = BlogConfig::default();
        blog.server.bind = "0.0.0.0:9000".parse().unwrap();
        blog.server.cors_permissive = true;

        let config = ServerConfig::from(&blog);
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.cors_permissive);
    }

    #[tokio::test]
    async fn state_requires_secret() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/blogicum_test")
            .unwrap();

        let mut blog = BlogConfig::default();
        assert!(AppState::from_config(pool.clone(), &blog).is_err());

        blog.auth.secret = Some("s3cret".into());
        let state = AppState::from_config(pool, &blog).unwrap();
        assert_eq!(state.media.max_image_bytes, blog.media.max_image_bytes);
    }

    mod router {
        use super::*;
        use axum::body::{to_bytes, Body};
        use axum::http::{header, Request, StatusCode};
        use tower::ServiceExt;
        use uuid::Uuid;

        /// Router over a pool that never connects: only requests answered
        /// before any query can be exercised here.
        fn app() -> (Router, SessionKeys) {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .connect_lazy("postgres://localhost/blogicum_test")
                .unwrap();
            let sessions = SessionKeys::new("test-secret", 1);
            let state = AppState {
                pool,
                sessions: sessions.clone(),
                media: MediaSettings {
                    root: std::env::temp_dir().join("blogicum-router-tests"),
                    max_image_bytes: 1024,
                },
            };
            (build_router(state, false), sessions)
        }

        fn json_request(method: &str, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            builder.body(Body::from(body.to_owned())).unwrap()
        }

        async fn error_code(response: axum::response::Response) -> String {
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            value["error"].as_str().unwrap_or_default().to_owned()
        }

        #[tokio::test]
        async fn health_endpoint() {
            let (app, _) = app();
            let response = app
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(value["status"], "ok");
            assert!(!value["version"].as_str().unwrap_or_default().is_empty());
            // The lazy pool may or may not reach a local server
            let database = value["database"].as_str().unwrap_or_default();
            assert!(matches!(database, "ok" | "unavailable"), "{}", database);
        }

        #[tokio::test]
        async fn login_required_routes_answer_401() {
            let (app, _) = app();
            let post_id = Uuid::new_v4();
            let comment_id = Uuid::new_v4();

            let cases = [
                ("POST", "/posts/create".to_owned()),
                ("GET", format!("/posts/{}/edit", post_id)),
                ("PUT", format!("/posts/{}/edit", post_id)),
                ("PUT", format!("/posts/{}/image", post_id)),
                ("DELETE", format!("/posts/{}/delete", post_id)),
                ("POST", format!("/posts/{}/comment", post_id)),
                ("PUT", format!("/posts/{}/edit_comment/{}", post_id, comment_id)),
                ("DELETE", format!("/posts/{}/delete_comment/{}", post_id, comment_id)),
                ("GET", "/edit_profile".to_owned()),
                ("POST", "/auth/password_change".to_owned()),
            ];

            for (method, uri) in cases {
                let response = app
                    .clone()
                    .oneshot(json_request(method, &uri, None, "{}"))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
                assert_eq!(error_code(response).await, "unauthorized");
            }
        }

        #[tokio::test]
        async fn invalid_token_is_401() {
            let (app, _) = app();
            let response = app
                .oneshot(json_request("GET", "/edit_profile", Some("not.a.token"), ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        #[tokio::test]
        async fn blank_post_title_is_400() {
            let (app, sessions) = app();
            let token = sessions.issue(Uuid::new_v4()).unwrap();
            let body = format!(r#"{{"title": "  ", "text": "x", "category_id": "{}"}}"#, Uuid::new_v4());

            let response = app
                .oneshot(json_request("POST", "/posts/create", Some(&token), &body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_code(response).await, "validation_error");
        }

        #[tokio::test]
        async fn session_cookie_is_accepted() {
            let (app, sessions) = app();
            let token = sessions.issue(Uuid::new_v4()).unwrap();

            let request = Request::builder()
                .method("POST")
                .uri(format!("/posts/{}/comment", Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, format!("blogicum_session={}", token))
                .body(Body::from(r#"{"text": ""}"#))
                .unwrap();

            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn registration_password_mismatch_is_400() {
            let (app, _) = app();
            let body = r#"{"username": "alice", "password1": "correct-horse", "password2": "battery-staple"}"#;

            let response = app
                .oneshot(json_request("POST", "/auth/registration", None, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn registration_weak_password_is_400() {
            let (app, _) = app();
            for body in [
                r#"{"username": "alice", "password1": "short", "password2": "short"}"#,
                r#"{"username": "alice", "password1": "12345678901", "password2": "12345678901"}"#,
                r#"{"username": "alice-in-wonder", "password1": "Alice-In-Wonder", "password2": "Alice-In-Wonder"}"#,
                r#"{"username": "not valid!", "password1": "correct-horse", "password2": "correct-horse"}"#,
            ] {
                let response = app
                    .clone()
                    .oneshot(json_request("POST", "/auth/registration", None, body))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
            }
        }

        #[tokio::test]
        async fn malformed_ids_are_404() {
            let (app, sessions) = app();
            let token = sessions.issue(Uuid::new_v4()).unwrap();

            for uri in ["/posts/not-a-uuid", "/posts/42/edit"] {
                let response = app
                    .clone()
                    .oneshot(json_request("GET", uri, Some(&token), ""))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
            }
        }

        #[tokio::test]
        async fn logout_clears_cookie() {
            let (app, _) = app();
            let request = Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, "blogicum_session=abc")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            let cookie = response
                .headers()
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert!(cookie.starts_with("blogicum_session=;"), "{}", cookie);
            assert!(cookie.contains("Max-Age=0"), "{}", cookie);
            assert!(cookie.contains("Path=/"), "{}", cookie);
        }

        #[tokio::test]
        async fn malformed_json_bodies_are_json_400() {
            let (app, sessions) = app();
            let token = sessions.issue(Uuid::new_v4()).unwrap();

            for body in [
                r#"{"title": "t", "text": "x", "category_id": "not-a-uuid"}"#,
                r#"{"title": "#,
            ] {
                let response = app
                    .clone()
                    .oneshot(json_request("POST", "/posts/create", Some(&token), body))
                    .await
                    .unwrap();
                assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
                assert_eq!(error_code(response).await, "bad_request", "{}", body);
            }
        }

        #[tokio::test]
        async fn missing_content_type_is_json_400() {
            let (app, _) = app();
            let request = Request::builder()
                .method("POST")
                .uri("/auth/login")
                .body(Body::from(r#"{"username": "alice", "password": "pw"}"#))
                .unwrap();

            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_code(response).await, "bad_request");
        }
    }
}
