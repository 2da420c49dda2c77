//! Category administration
//!
//! Posts are filed under categories; a hidden category hides its posts from
//! the index and category feeds.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blogicum_server::db::{Category, CategoryRepo, NewCategory};
use blogicum_server::models::{CategorySlug, Title};

use super::{connect, load_config, DatabaseArgs};

#[derive(Parser, Debug)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommands,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add(AddArgs),
    /// List all categories
    List,
    /// Make a category and its posts visible
    Publish {
        /// Category slug
        slug: String,
    },
    /// Hide a category and its posts
    Hide {
        /// Category slug
        slug: String,
    },
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Display title
    #[arg(long)]
    pub title: String,

    /// URL identifier: latin letters, digits, hyphen and underscore
    #[arg(long)]
    pub slug: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Create hidden
    #[arg(long)]
    pub unpublished: bool,
}

impl AddArgs {
    fn validate(&self) -> Result<NewCategory> {
        Ok(NewCategory {
            title: Title::new("title", &self.title)?,
            description: self.description.trim().to_owned(),
            slug: CategorySlug::new(&self.slug)?,
            is_published: !self.unpublished,
        })
    }
}

pub async fn run_category(args: CategoryArgs) -> Result<()> {
    // Validate before connecting so typos fail fast
    let new = match &args.command {
        CategoryCommands::Add(add) => Some(add.validate()?),
        _ => None,
    };

    let config = load_config(&args.db)?;
    let pool = connect(&config).await?;
    let repo = CategoryRepo::new(&pool);

    match args.command {
        CategoryCommands::Add(_) => {
            if let Some(new) = new {
                let category = repo.create(&new).await.context("Failed to create category")?;
                tracing::info!(slug = %category.slug, "Category created");
                print_row(&category);
            }
        }
        CategoryCommands::List => {
            let categories = repo.list().await?;
            if categories.is_empty() {
                println!("No categories yet. Add one with: blogicum category add --title T --slug S");
            }
            for category in &categories {
                print_row(category);
            }
        }
        CategoryCommands::Publish { slug } => {
            let category = repo.set_published(&slug, true).await?;
            print_row(&category);
        }
        CategoryCommands::Hide { slug } => {
            let category = repo.set_published(&slug, false).await?;
            print_row(&category);
        }
    }

    Ok(())
}

fn print_row(category: &Category) {
    let status = if category.is_published { "published" } else { "hidden" };
    println!("{:<24} {:<10} {}", category.slug, status, category.title);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(title: &str, slug: &str) -> AddArgs {
        AddArgs {
            title: title.into(),
            slug: slug.into(),
            description: String::new(),
            unpublished: false,
        }
    }

    #[test]
    fn add_args_validate() {
        let new = add("Travel", "travel").validate().unwrap();
        assert_eq!(new.slug.as_str(), "travel");
        assert!(new.is_published);
    }

    #[test]
    fn add_args_reject_bad_slug() {
        assert!(add("Travel", "путешествия").validate().is_err());
        assert!(add("  ", "travel").validate().is_err());
    }
}
