//! Database operations for the storefront SQLite database.
//!
//! ## Tables
//!
//! - `users` - Registered accounts (login is UNIQUE)
//! - `tower_sessions` - Server-side sessions, owned by `tower-sessions-sqlx-store`
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded into
//! the binary. They run at startup and via:
//! ```bash
//! cargo run -p corner-shop-cli -- migrate
//! ```

pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use users::UserRepository;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The row to update does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed domain validation.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a SQLite connection pool.
///
/// The database file is created if missing. WAL journaling lets readers
/// proceed while a registration is being written.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Run the embedded schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history diverges.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    /// A migrated, private in-memory database.
    ///
    /// One connection only: every connection to `sqlite::memory:` opens its
    /// own empty database.
    #[allow(clippy::expect_used)]
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite opens");
        super::migrate(&pool).await.expect("migrations apply");
        pool
    }
}
