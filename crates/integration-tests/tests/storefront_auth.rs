//! Integration tests for registration, login, sessions and profile pages.

#![allow(clippy::unwrap_used)]

use corner_shop_integration_tests::{TestApp, location};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_form_registration_redirects_to_login() {
    let app = TestApp::spawn().await;

    let resp = app.register("alice", "secret-pw").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login?success=registered"));

    let page = app.get("/login?success=registered").await.text().await.unwrap();
    assert!(page.contains("Account created"));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts_and_keeps_first() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;

    let resp = app.register("alice", "another-pw").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(resp.text().await.unwrap().contains("already taken"));

    let resp = app.login("alice", "secret-pw").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_json_registration() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "login": "bob",
            "password": "hunter2-hunter2",
            "first_name": "Bob",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["login"], "bob");
    assert_eq!(body["first_name"], "Bob");
    assert_eq!(body["last_name"], "");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());

    let resp = app
        .client
        .post(app.url("/register"))
        .json(&json!({ "login": "bob", "password": "whatever-else" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation_errors_are_bad_requests() {
    let app = TestApp::spawn().await;

    let resp = app.register("alice", "short").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let page = resp.text().await.unwrap();
    assert!(page.contains("at least 8 characters"));
    assert!(page.contains("value=\"alice\""));

    let resp = app.register("not valid!", "secret-pw").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post_form(
            "/register",
            &[
                ("login", "carol"),
                ("password", "secret-pw"),
                ("birth_date", "31/01/1990"),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;

    let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE login = 'alice'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(hash, "secret-pw");
    assert!(hash.starts_with("$argon2id$"));
}

// ============================================================================
// Login & Sessions
// ============================================================================

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;

    let resp = app.login("alice", "wrong-password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.text().await.unwrap().contains("Invalid login or password"));
    assert!(app.cookie("user_login").is_none());

    let resp = app.login("nobody", "secret-pw").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_opaque_session_cookie() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;

    let resp = app.login("alice", "secret-pw").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/profile"));

    let session_id = app.cookie("user_login").unwrap();
    assert_ne!(session_id, "alice");
    assert!(!session_id.contains("alice"));

    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("alice"));
    assert!(page.contains("Test User"));
    assert!(page.contains("1990-01-31"));
}

#[tokio::test]
async fn test_protected_routes_redirect_without_session() {
    let app = TestApp::spawn().await;

    for path in ["/profile", "/user/view"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), Some("/login"), "{path}");
    }

    let resp = app
        .post_form("/profile/change-password", &[("new_password", "anything-long")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
async fn test_forged_session_cookie_is_rejected() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;

    app.set_raw_cookie("user_login", "alice");
    let resp = app.get("/profile").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;
    app.login("alice", "secret-pw").await;
    let old_session = app.cookie("user_login").unwrap();

    let resp = app.post_form("/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/"));

    let resp = app.get("/profile").await;
    assert_eq!(location(&resp), Some("/login"));

    // Replaying the old cookie from another client does not resurrect the session
    let resp = app
        .fresh_client()
        .get(app.url("/profile"))
        .header(reqwest::header::COOKIE, format!("user_login={old_session}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

// ============================================================================
// Profile & Users
// ============================================================================

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;
    app.login("alice", "secret-pw").await;

    let resp = app
        .post_form("/profile/change-password", &[("new_password", "tiny")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post_form("/profile/change-password", &[("new_password", "brand-new-pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/profile?success=password_changed"));

    let page = app
        .get("/profile?success=password_changed")
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("Password changed"));

    app.post_form("/logout", &[]).await;
    assert_eq!(
        app.login("alice", "secret-pw").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.login("alice", "brand-new-pw").await.status(),
        StatusCode::SEE_OTHER
    );
}

#[tokio::test]
async fn test_user_list_shows_users_without_hashes() {
    let app = TestApp::spawn().await;
    app.register("alice", "secret-pw").await;
    app.register("bob", "secret-pw").await;
    app.login("alice", "secret-pw").await;

    let resp = app.get("/user/view").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = resp.text().await.unwrap();
    assert!(page.contains("alice"));
    assert!(page.contains("bob"));
    assert!(!page.contains("$argon2"));
}

// ============================================================================
// Health & Rate Limiting
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_is_rate_limited_when_enabled() {
    let app = TestApp::spawn_with(|config| config.rate_limit = true).await;

    let mut statuses = Vec::new();
    for _ in 0..8 {
        statuses.push(app.login("alice", "wrong-password").await.status());
    }

    assert_eq!(statuses[0], StatusCode::UNAUTHORIZED);
    assert_eq!(statuses.last(), Some(&StatusCode::TOO_MANY_REQUESTS));

    // Login pages stay reachable
    assert_eq!(app.get("/login").await.status(), StatusCode::OK);
}
