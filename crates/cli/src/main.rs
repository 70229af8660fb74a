//! Cafe WiFi CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cafe-wifi-cli migrate
//!
//! # Seed the database with demo cafes and a demo account
//! cafe-wifi-cli seed --count 25
//!
//! # Mint an admin token without going through the HTTP API
//! cafe-wifi-cli create-admin-token --level super
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with demo data
//! - `create-admin-token` - Sign an admin JWT with the configured secret

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cafe-wifi-cli")]
#[command(author, version, about = "Cafe WiFi directory CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo cafes and a demo account
    Seed {
        /// Number of cafes to create
        #[arg(short, long, default_value_t = 10)]
        count: u32,
    },
    /// Sign an admin token with the configured JWT secret
    CreateAdminToken {
        /// Admin level to embed (`standard` or `super`)
        #[arg(short, long, default_value = "standard")]
        level: String,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { count } => commands::seed::run(count).await?,
        Commands::CreateAdminToken { level } => commands::admin::create_token(&level)?,
    }
    Ok(())
}
