use anyhow::{Context, Result};
use blogicum_core::BlogConfig;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with defaults and a fresh session secret
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Show the effective config (file + environment), secret redacted
    Show,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
    }
}

/// Two v4 UUIDs, hex encoded: 64 characters carrying 244 random bits.
fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = BlogConfig::config_path();

    // Check if config already exists
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {}\n\nUse --force to overwrite",
            config_path.display()
        ));
    }

    let mut config = BlogConfig::default();
    config.auth.secret = Some(generate_secret());

    config
        .save_to(&config_path)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    println!("Created config at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set database.url (or DATABASE_URL) to your PostgreSQL database");
    println!("  2. Run: blogicum migrate");
    println!("  3. Run: blogicum serve");

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", BlogConfig::config_path().display());
    Ok(())
}

fn run_show() -> Result<()> {
    let mut config = BlogConfig::load().context("Failed to load configuration")?;
    if config.auth.secret.is_some() {
        config.auth.secret = Some("********".to_owned());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
