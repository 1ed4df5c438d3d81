//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login name fails validation.
    #[error("invalid login: {0}")]
    InvalidLogin(#[from] corner_shop_core::LoginError),

    /// Profile fields fail validation.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Login is already registered.
    #[error("login already registered")]
    DuplicateLogin,

    /// The session identity no longer maps to an account.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
