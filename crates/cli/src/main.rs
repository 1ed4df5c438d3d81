//! Corner Shop CLI - Database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema and session-store migrations
//! shop-cli migrate
//!
//! # Create a user (password read from stdin)
//! echo 'correct horse' | shop-cli user create -l alice --first-name Alice
//!
//! # List users
//! shop-cli user list
//! ```
//!
//! Configuration comes from the same environment variables as the
//! storefront (`STOREFRONT_DATABASE_URL`, `ARGON2_*`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Corner Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage storefront users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user; the password is read from stdin
    Create {
        /// Login name
        #[arg(short, long)]
        login: String,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        birth_date: String,
    },
    /// List registered users
    List,
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
                login,
                first_name,
                last_name,
                birth_date,
            } => {
                commands::user::create(&login, first_name, last_name, birth_date).await?;
            }
            UserAction::List => commands::user::list().await?,
        },
    }
    Ok(())
}
