//! Bolao CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! bolao-cli migrate
//!
//! # Create an account (e.g. the first administrator)
//! bolao-cli user create -e admin@example.com -n "Admin Name" -p 'S3cure!pass'
//!
//! # Delete reset tokens that expired or were used more than a day ago
//! bolao-cli tokens purge --older-than-hours 24
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bolao-cli")]
#[command(author, version, about = "Bolao CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Maintain password reset tokens
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Email address (login identity)
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Initial password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Delete reset tokens that expired or were used before the cutoff
    Purge {
        /// Keep tokens touched within this many hours
        #[arg(long, default_value_t = 24)]
        older_than_hours: i64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password,
            } => {
                commands::user::create(&email, &name, password).await?;
            }
        },
        Commands::Tokens { action } => match action {
            TokenAction::Purge { older_than_hours } => {
                commands::tokens::purge(older_than_hours).await?;
            }
        },
    }
    Ok(())
}
