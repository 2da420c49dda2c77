//! PostgreSQL pool built from the `[database]` config section

use std::time::Duration;

use blogicum_core::DatabaseSection;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// How long a request waits for a free connection before failing.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool limits for `section`. A zero `max_connections` still gets one.
pub fn pool_options(section: &DatabaseSection) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(section.max_connections.max(1))
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

/// Connect to the database named in `section`.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn connect(section: &DatabaseSection) -> Result<PgPool, sqlx::Error> {
    let pool = pool_options(section).connect(&section.url).await?;
    tracing::debug!(max_connections = pool.options().get_max_connections(), "database pool ready");
    Ok(pool)
}
