//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (record id on the span, echo in response)
//! 4. Security headers (CSP, framing, caching)
//! 5. Session layer (tower-sessions with SQLite store)
//! 6. Rate limiting on `POST /login` and `POST /register` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAuth, Unauthenticated, authorize, clear_current_user, set_current_user,
};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store};
