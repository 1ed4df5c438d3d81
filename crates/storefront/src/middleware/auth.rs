//! Authentication gate and extractors.
//!
//! The session cookie carries only an opaque id; the logged-in identity is
//! the [`CurrentUser`] stored under [`session_keys::CURRENT_USER`] in the
//! server-side session.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};

/// Marker error: the request carries no logged-in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("not authenticated")]
pub struct Unauthenticated;

/// Resolve the identity stored in the session.
///
/// Session store failures are treated as unauthenticated.
///
/// # Errors
///
/// Returns `Unauthenticated` if no user is logged in.
pub async fn authorize(session: &Session) -> Result<CurrentUser, Unauthenticated> {
    match session.get::<CurrentUser>(session_keys::CURRENT_USER).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(Unauthenticated),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read session");
            Err(Unauthenticated)
        }
    }
}

/// Extractor that requires an authenticated user.
///
/// If the user is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.login)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl AuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = authorize(session)
            .await
            .map_err(|Unauthenticated| AuthRejection::for_path(parts.uri.path()))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => authorize(session).await.ok(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the logged-in user in the session.
///
/// Rotates the session id first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Drop the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use corner_shop_core::{Login, UserId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            login: Login::parse("alice").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_authorize_without_identity() {
        assert_eq!(authorize(&session()).await, Err(Unauthenticated));
    }

    #[tokio::test]
    async fn test_authorize_after_login_and_logout() {
        let session = session();
        set_current_user(&session, &alice()).await.unwrap();
        assert_eq!(authorize(&session).await, Ok(alice()));

        clear_current_user(&session).await.unwrap();
        assert_eq!(authorize(&session).await, Err(Unauthenticated));
    }

    #[test]
    fn test_rejection_depends_on_path() {
        assert_eq!(
            AuthRejection::for_path("/api/users"),
            AuthRejection::Unauthorized
        );
        assert_eq!(
            AuthRejection::for_path("/profile"),
            AuthRejection::RedirectToLogin
        );
    }
}
