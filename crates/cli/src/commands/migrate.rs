//! Database migration command.
//!
//! Applies the embedded schema migrations from `crates/storefront/migrations/`
//! and creates the session store table. Both steps are idempotent.

use corner_shop_storefront::{db, middleware};

use super::{CommandError, connect};

/// Run storefront database migrations.
pub async fn run() -> Result<(), CommandError> {
    let (_, pool) = connect().await?;

    tracing::info!("Running storefront migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Creating session store table...");
    middleware::create_session_store(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
