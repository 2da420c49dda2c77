//! HTTP server command
//!
//! Loads config, connects the pool and runs the API until Ctrl+C/SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use blogicum_server::http::{run_server, AppState, ServerConfig};

use super::{connect, load_config, redact_url, DatabaseArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides server.bind / BLOGICUM_BIND)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.db)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if args.cors_permissive {
        config.server.cors_permissive = true;
    }

    // Fail before touching the database when no secret is configured
    config.require_secret()?;

    std::fs::create_dir_all(&config.media.root).with_context(|| {
        format!("Failed to create media directory {}", config.media.root.display())
    })?;

    tracing::info!(
        bind = %config.server.bind,
        database = %redact_url(&config.database.url),
        "Starting blogicum server"
    );

    let pool = connect(&config).await?;
    let state = AppState::from_config(pool, &config)?;

    // Run server (blocks until shutdown)
    run_server(state, ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}
