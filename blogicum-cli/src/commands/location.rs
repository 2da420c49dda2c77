//! Location administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_server::db::{Location, LocationRepo};
use blogicum_server::models::Title;

use super::{connect, load_config, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct LocationArgs {
    #[command(subcommand)]
    pub command: LocationCommands,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Subcommand, Debug)]
pub enum LocationCommands {
    /// Create a location
    Add {
        /// Place name
        #[arg(long)]
        name: String,

        /// Create hidden; posts will not show it
        #[arg(long)]
        unpublished: bool,
    },
    /// List all locations
    List,
}

pub async fn run_location(args: LocationArgs) -> Result<()> {
    let name = match &args.command {
        LocationCommands::Add { name, .. } => Some(Title::new("name", name)?),
        LocationCommands::List => None,
    };

    let config = load_config(&args.db)?;
    let pool = connect(&config).await?;
    let repo = LocationRepo::new(&pool);

    match (args.command, name) {
        (LocationCommands::Add { unpublished, .. }, Some(name)) => {
            let location = repo
                .create(&name, !unpublished)
                .await
                .context("Failed to create location")?;
            tracing::info!(location_id = %location.id, "Location created");
            print_row(&location);
        }
        _ => {
            for location in repo.list().await? {
                print_row(&location);
            }
        }
    }

    Ok(())
}

fn print_row(location: &Location) {
    let status = if location.is_published { "published" } else { "hidden" };
    println!("{} {:<10} {}", location.id, status, location.name);
}
