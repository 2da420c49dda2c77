//! Schema migration command

use anyhow::{Context, Result};
use clap::Parser;

use blogicum_server::db::migrations;

use super::{connect, load_config, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Create any missing tables and indexes. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let config = load_config(&args.db)?;
    let pool = connect(&config).await?;

    migrations::run(&pool)
        .await
        .context("Migration failed")?;

    println!("Schema is up to date ({} tables)", migrations::TABLES.len());
    Ok(())
}
