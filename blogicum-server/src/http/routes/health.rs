//! Liveness plus a database ping

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;

use crate::http::server::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// `"ok"` or `"unavailable"`
    pub database: &'static str,
}

async fn ping(pool: &PgPool) -> bool {
    match tokio::time::timeout(PING_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "health check: database ping failed");
            false
        }
        Err(_) => {
            tracing::warn!("health check: database ping timed out");
            false
        }
    }
}

/// GET /health - always 200 while the process serves requests
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = if ping(&state.pool).await { "ok" } else { "unavailable" };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
