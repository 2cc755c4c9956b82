//! User Form CLI - schema setup and user management.
//!
//! # Usage
//!
//! ```bash
//! # Create the users table (idempotent)
//! uf-cli migrate
//!
//! # Manage users
//! uf-cli users list
//! uf-cli users show 1
//! uf-cli users create -n "Ada Lovelace" -m 9876543210 -e ada@example.com
//! uf-cli users delete 1
//! ```
//!
//! Every command reads `DATABASE_URL` from the environment (or `.env`), or
//! from `--database-url`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "uf-cli")]
#[command(author, version, about = "User Form CLI tools")]
struct Cli {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the users table if it does not exist
    Migrate,
    /// Manage users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List all users, newest first
    List,
    /// Show one user
    Show {
        /// User ID
        id: String,
    },
    /// Create a user
    Create {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// 10-digit mobile number
        #[arg(short, long)]
        mobile: String,

        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads DATABASE_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_form_cli=info,user_form_api=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = cli
        .database_url
        .map(SecretString::from)
        .ok_or("Missing environment variable: DATABASE_URL")?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&database_url).await?,
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&database_url).await?,
            UserAction::Show { id } => commands::users::show(&database_url, &id).await?,
            UserAction::Create {
                name,
                mobile,
                email,
            } => commands::users::create(&database_url, name, mobile, email).await?,
            UserAction::Delete { id } => commands::users::delete(&database_url, &id).await?,
        },
    }
    Ok(())
}
