//! Authentication route handlers.
//!
//! Handles login, registration and logout against the local credential
//! store. Registration accepts either an HTML form or a JSON body.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Profile, User};
use crate::services::AuthError;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// Registration data, from a form or a JSON body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub birth_date: String,
}

/// Registration body, dispatched on `Content-Type`.
///
/// `application/json` bodies are read as JSON; anything else as an
/// urlencoded form.
#[derive(Debug)]
pub enum RegisterPayload {
    Form(RegisterRequest),
    Json(RegisterRequest),
}

impl<S> FromRequest<S> for RegisterPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<RegisterRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Json(body))
        } else {
            let Form(body) = Form::<RegisterRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self::Form(body))
        }
    }
}

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
}

/// JSON view of a registered user. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_i64(),
            login: user.login.to_string(),
            first_name: user.profile.first_name.clone(),
            last_name: user.profile.last_name.clone(),
            birth_date: user.profile.birth_date.clone(),
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub current_login: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub login: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub current_login: Option<String>,
    pub error: Option<String>,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
}

fn success_message(code: Option<&str>) -> Option<String> {
    match code? {
        "registered" => Some("Account created. You can log in now.".to_string()),
        _ => None,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(viewer): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        current_login: viewer.map(|u| u.login.into_inner()),
        error: None,
        success: success_message(query.success.as_deref()),
        login: String::new(),
    }
}

/// Handle login form submission.
///
/// On success the session id is rotated, the identity stored server-side
/// and the browser redirected to the profile. Failures re-render the form
/// with 401.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth().login(&form.login, &form.password).await {
        Ok(user) => {
            set_current_user(&session, &CurrentUser::from(&user)).await?;
            set_sentry_user(&user.id, user.login.as_str());
            tracing::info!(user_id = %user.id, "user logged in");
            Ok(Redirect::to("/profile").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(login = %form.login, "login failed");
            let page = LoginTemplate {
                current_login: None,
                error: Some("Invalid login or password.".to_string()),
                success: None,
                login: form.login,
            };
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(viewer): OptionalAuth) -> impl IntoResponse {
    RegisterTemplate {
        current_login: viewer.map(|u| u.login.into_inner()),
        error: None,
        login: String::new(),
        first_name: String::new(),
        last_name: String::new(),
        birth_date: String::new(),
    }
}

/// Handle registration.
///
/// Form posts redirect to the login page on success and re-render the form
/// on validation failures. JSON posts answer 201 with the created user, or
/// the error status.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    payload: RegisterPayload,
) -> Response {
    match payload {
        RegisterPayload::Json(request) => match register_user(&state, &request).await {
            Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(&user))).into_response(),
            Err(e) => AppError::from(e).into_response(),
        },
        RegisterPayload::Form(request) => match register_user(&state, &request).await {
            Ok(_) => Redirect::to("/login?success=registered").into_response(),
            Err(e) => {
                let err = AppError::from(e);
                let status = err.status();
                if status.is_server_error() {
                    return err.into_response();
                }

                let page = RegisterTemplate {
                    current_login: viewer.map(|u| u.login.into_inner()),
                    error: Some(err.public_message()),
                    login: request.login,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    birth_date: request.birth_date,
                };
                (status, page).into_response()
            }
        },
    }
}

async fn register_user(state: &AppState, request: &RegisterRequest) -> Result<User, AuthError> {
    let profile = Profile {
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        birth_date: request.birth_date.clone(),
    };

    let result = state
        .auth()
        .register(&request.login, &request.password, profile)
        .await;

    if let Err(e) = &result {
        tracing::warn!(error = %e, "registration rejected");
    }
    result
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Deletes the server-side session, which invalidates the cookie.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}
