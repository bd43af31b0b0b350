//! Éclat CLI - catalog seeding and inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # Show which backing store the environment selects
//! eclat-cli mode
//!
//! # Seed brands, categories, products and contact info from YAML
//! eclat-cli seed catalog.yaml
//!
//! # List a collection
//! eclat-cli list products
//! ```
//!
//! # Commands
//!
//! - `mode` - Print the active backing-store mode
//! - `seed` - Seed the catalog from a YAML file
//! - `list` - List products, brands or categories

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "eclat-cli")]
#[command(author, version, about = "Éclat CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the backing-store mode selected by the environment
    Mode,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the seed file
        file: String,
    },
    /// List a catalog collection
    List {
        #[command(subcommand)]
        target: ListTarget,
    },
}

#[derive(Subcommand)]
enum ListTarget {
    /// List products with their brand and category
    Products,
    /// List brands
    Brands,
    /// List utility categories
    Categories,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Mode => commands::mode()?,
        Commands::Seed { file } => commands::seed::from_file(&file).await?,
        Commands::List { target } => {
            let catalog = commands::open_catalog().await?;
            match target {
                ListTarget::Products => commands::list::products(&catalog).await?,
                ListTarget::Brands => commands::list::brands(&catalog).await?,
                ListTarget::Categories => commands::list::categories(&catalog).await?,
            }
        }
    }
    Ok(())
}
