//! Corner Shop storefront binary.
//!
//! Serves the catalog, account pages and cookie cart on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates for server-side rendering
//! - SQLite for accounts and server-side sessions
//! - Cart state held client-side in the `cart` cookie

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;

use corner_shop_storefront::{app, config::StorefrontConfig, db, middleware, state::AppState};
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions::ExpiredDeletion;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Interval between sweeps of expired sessions.
const SESSION_SWEEP_INTERVAL: tokio::time::Duration = tokio::time::Duration::from_secs(60 * 60);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corner_shop_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "storefront exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::migrate(&pool).await?;
    tracing::info!("Database migrations applied");

    let session_store = middleware::create_session_store(&pool).await?;
    let sweeper = tokio::spawn(
        session_store
            .clone()
            .continuously_delete_expired(SESSION_SWEEP_INTERVAL),
    );

    let addr = config.socket_addr();
    let state = AppState::new(config, pool)?;

    let app = app(state, session_store)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("storefront listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
