//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit local development.
//!
//! - `STOREFRONT_DATABASE_URL` - SQLite connection string (falls back to
//!   `DATABASE_URL`, then `sqlite://corner_shop.db?mode=rwc`)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://localhost:3000`).
//!   An `https://` URL marks cookies `Secure`.
//! - `STOREFRONT_STATIC_DIR` - Static asset directory (default: `crates/storefront/static`)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit login/registration (default: true)
//! - `ARGON2_MEMORY_KIB` - Password hash memory cost (default: 19456)
//! - `ARGON2_ITERATIONS` - Password hash time cost (default: 2)
//! - `ARGON2_PARALLELISM` - Password hash lanes (default: 1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://corner_shop.db?mode=rwc";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// SQLite database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Whether login and registration are rate limited per client IP
    pub rate_limit: bool,
    /// Password hashing cost
    pub password_hash: PasswordHashConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Argon2id cost parameters.
///
/// Changing these only affects newly written hashes; existing hashes carry
/// their own parameters and keep verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    /// Memory size in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashConfig {
    /// Build Argon2 parameters, rejecting out-of-range costs.
    ///
    /// # Errors
    ///
    /// Returns the Argon2 error message if the combination is invalid
    /// (e.g. memory below `8 * parallelism` KiB).
    pub fn params(&self) -> Result<argon2::Params, String> {
        argon2::Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| e.to_string())
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            memory_kib: parse_env_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_env_or("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_env_or("ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        config
            .params()
            .map_err(|e| ConfigError::InvalidEnvVar("ARGON2_*".to_string(), e))?;

        Ok(config)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// the password hashing costs are out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL");
        let host = parse_env_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_env_or("STOREFRONT_PORT", 3000_u16)?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let static_dir = PathBuf::from(get_env_or_default(
            "STOREFRONT_STATIC_DIR",
            "crates/storefront/static",
        ));
        let rate_limit = parse_env_or("STOREFRONT_RATE_LIMIT", true)?;
        let password_hash = PasswordHashConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            static_dir,
            rate_limit,
            password_hash,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> SecretString {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_or_else(
            |_| SecretString::from(DEFAULT_DATABASE_URL),
            SecretString::from,
        )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
