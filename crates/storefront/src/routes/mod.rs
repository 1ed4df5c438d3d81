//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Product catalog
//! GET  /health                   - Liveness
//! GET  /health/ready             - Readiness (database)
//!
//! # Auth
//! GET  /login                    - Login page
//! POST /login                    - Login action (rate limited)
//! GET  /register                 - Register page
//! POST /register                 - Register action, form or JSON (rate limited)
//! POST /logout                   - Logout action
//!
//! # Account (requires auth)
//! GET  /user/view                - Registered users
//! GET  /profile                  - Current user's profile
//! POST /profile/change-password  - Change password
//!
//! # Cart (cookie)
//! GET  /cart                     - Cart page
//! POST /add-to-cart              - Add one unit
//! POST /remove-from-cart         - Remove one unit
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod users;

use axum::{
    Router,
    routing::{MethodRouter, get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::middleware::rate_limit::RateLimiterLayer;
use crate::state::AppState;

/// Wrap a credential-handling method router in the shared limiter, if any.
fn limited(
    method_router: MethodRouter<AppState>,
    limiter: Option<&RateLimiterLayer>,
) -> MethodRouter<AppState> {
    match limiter {
        Some(layer) => method_router.layer(layer.clone()),
        None => method_router,
    }
}

/// Create the auth routes router.
///
/// `POST /login` and `POST /register` share one per-IP budget.
pub fn auth_routes(config: &StorefrontConfig) -> Router<AppState> {
    let limiter = config.rate_limit.then(auth_rate_limiter);

    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(limited(post(auth::login), limiter.as_ref())),
        )
        .route(
            "/register",
            get(auth::register_page).merge(limited(post(auth::register), limiter.as_ref())),
        )
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/user/view", get(users::index))
        .route("/profile", get(account::profile))
        .route("/profile/change-password", post(account::change_password))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/add-to-cart", post(cart::add))
        .route("/remove-from-cart", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes(config))
        .merge(account_routes())
        .merge(cart_routes())
}
