//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::services::AuthService;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid password hashing parameters: {0}")]
    InvalidPasswordHashParams(String),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    password_params: argon2::Params,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - SQLite connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the password hashing parameters are out of range.
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Result<Self, StateError> {
        let password_params = config
            .password_hash
            .params()
            .map_err(StateError::InvalidPasswordHashParams)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                password_params,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Authentication service bound to this state's pool.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.pool, &self.inner.password_params)
    }
}
