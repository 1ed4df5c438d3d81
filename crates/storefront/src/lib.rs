//! Corner Shop storefront library.
//!
//! Router, handlers and services for the storefront binary, exposed as a
//! library so the integration tests can drive the full stack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Build the storefront application.
///
/// Layers, outermost first: tracing span, request id, security headers,
/// session. Sentry layers are added by the binary.
pub fn app(state: AppState, session_store: SqliteStore) -> Router {
    let session_layer = create_session_layer(session_store, state.config());
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .merge(routes::routes(state.config()))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
