//! Mercado CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (application tables + session store)
//! mercado-cli migrate
//!
//! # Grant or revoke a role flag
//! mercado-cli role grant -e admin@example.com -r admin
//! mercado-cli role revoke -e courier@example.com -r delivery
//!
//! # Seed demo marketplace data
//! mercado-cli seed
//! ```
//!
//! The admin flag can only be granted here; the admin web surface refuses
//! to toggle roles on admin accounts.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mercado-cli")]
#[command(author, version, about = "Mercado CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage account role flags
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    /// Seed the database with demo marketplace data
    Seed,
}

#[derive(Subcommand)]
enum RoleAction {
    /// Grant a role flag to an account
    Grant {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Role flag (`seller`, `admin`, `delivery`)
        #[arg(short, long)]
        role: String,
    },
    /// Revoke a role flag from an account
    Revoke {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Role flag (`seller`, `admin`, `delivery`)
        #[arg(short, long)]
        role: String,
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
        Commands::Role { action } => match action {
            RoleAction::Grant { email, role } => {
                commands::role::set(&email, &role, true).await?;
            }
            RoleAction::Revoke { email, role } => {
                commands::role::set(&email, &role, false).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
