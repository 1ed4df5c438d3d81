//! Integration tests for Corner Shop.
//!
//! Each test spawns the full storefront router on an ephemeral port, backed
//! by a private in-memory SQLite database, and drives it over HTTP with a
//! cookie-keeping `reqwest` client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-shop-integration-tests
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use corner_shop_storefront::config::{PasswordHashConfig, StorefrontConfig};
use corner_shop_storefront::{app, db, middleware, state::AppState};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Response, Url};
use secrecy::SecretString;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// A running storefront plus a browser-like client.
pub struct TestApp {
    pub base_url: Url,
    pub client: Client,
    pub cookies: Arc<Jar>,
    pub pool: SqlitePool,
}

/// Configuration used by tests: no rate limiting, cheap password hashing.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
        rate_limit: false,
        password_hash: PasswordHashConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

impl TestApp {
    /// Spawn a storefront with [`test_config`].
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a storefront after adjusting the test configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let mut config = test_config();
        configure(&mut config);

        // One connection: each connection to `sqlite::memory:` is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        db::migrate(&pool).await.expect("Failed to run migrations");
        let store = middleware::create_session_store(&pool)
            .await
            .expect("Failed to create session store");

        let state = AppState::new(config, pool.clone()).expect("Invalid test configuration");
        let router = app(state, store);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Test server failed");
        });

        let base_url = Url::parse(&format!("http://{addr}")).expect("Invalid base URL");
        let cookies = Arc::new(Jar::default());
        let client = browser(Arc::clone(&cookies));

        Self {
            base_url,
            client,
            cookies,
            pool,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("Invalid path")
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Register through the HTML form.
    pub async fn register(&self, login: &str, password: &str) -> Response {
        self.post_form(
            "/register",
            &[
                ("login", login),
                ("password", password),
                ("first_name", "Test"),
                ("last_name", "User"),
                ("birth_date", "1990-01-31"),
            ],
        )
        .await
    }

    pub async fn login(&self, login: &str, password: &str) -> Response {
        self.post_form("/login", &[("login", login), ("password", password)])
            .await
    }

    /// Decoded value of a cookie currently held by the client.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split("; ")
            .filter_map(|pair| Cookie::parse_encoded(pair.to_string()).ok())
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }

    /// Overwrite a cookie in the client's jar with a raw (encoded) value.
    pub fn set_raw_cookie(&self, name: &str, raw_value: &str) {
        self.cookies
            .add_cookie_str(&format!("{name}={raw_value}; Path=/"), &self.base_url);
    }

    /// Items in the client's cart cookie.
    #[must_use]
    pub fn cart_items(&self) -> Vec<String> {
        self.cookie("cart")
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// A second, cookie-less browser pointed at the same server.
    #[must_use]
    pub fn fresh_client(&self) -> Client {
        browser(Arc::new(Jar::default()))
    }
}

fn browser(cookies: Arc<Jar>) -> Client {
    Client::builder()
        .cookie_provider(cookies)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
