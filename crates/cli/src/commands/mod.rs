//! CLI subcommands.

pub mod migrate;
pub mod user;

use corner_shop_storefront::config::{ConfigError, StorefrontConfig};
use corner_shop_storefront::db;
use corner_shop_storefront::services::AuthError;
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("invalid password hashing parameters: {0}")]
    PasswordParams(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("failed to read password: {0}")]
    Io(#[from] std::io::Error),
}

/// Load configuration and open the storefront database.
async fn connect() -> Result<(StorefrontConfig, SqlitePool), CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}
