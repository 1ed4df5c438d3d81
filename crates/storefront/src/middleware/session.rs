//! Session middleware configuration.
//!
//! Sessions live in SQLite via `tower-sessions-sqlx-store`; the browser only
//! holds the random session id in the `user_login` cookie.

use sqlx::SqlitePool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "user_login";

/// Session inactivity expiry in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session store and its table.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn create_session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer over an existing store.
#[must_use]
pub fn create_session_layer(
    store: SqliteStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<SqliteStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
