//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, clear_current_user};
use crate::models::CurrentUser;
use crate::routes::users::UserView;
use crate::services::AuthError;
use crate::state::AppState;

/// Change password form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub new_password: String,
}

/// Query parameters for success display.
#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub success: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub current_login: Option<String>,
    pub user: UserView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the current user's profile.
///
/// A session whose user has since been removed is flushed and sent back to
/// the login page.
#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
    Query(query): Query<ProfileQuery>,
) -> Result<Response, AppError> {
    let success = match query.success.as_deref() {
        Some("password_changed") => Some("Password changed.".to_string()),
        _ => None,
    };

    render_profile(&state, &session, &current_user, StatusCode::OK, None, success).await
}

/// Handle the change password form.
#[instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Response, AppError> {
    match state
        .auth()
        .change_password(&current_user, &form.new_password)
        .await
    {
        Ok(()) => Ok(Redirect::to("/profile?success=password_changed").into_response()),
        Err(AuthError::WeakPassword(message)) => {
            render_profile(
                &state,
                &session,
                &current_user,
                StatusCode::BAD_REQUEST,
                Some(message),
                None,
            )
            .await
        }
        Err(AuthError::NotAuthenticated) => forget_session(&session).await,
        Err(e) => Err(e.into()),
    }
}

async fn render_profile(
    state: &AppState,
    session: &Session,
    current_user: &CurrentUser,
    status: StatusCode,
    error: Option<String>,
    success: Option<String>,
) -> Result<Response, AppError> {
    let user = match state.auth().current_user(current_user).await {
        Ok(user) => user,
        Err(AuthError::NotAuthenticated) => return forget_session(session).await,
        Err(e) => return Err(e.into()),
    };

    let page = ProfileTemplate {
        current_login: Some(user.login.to_string()),
        user: UserView::from(&user),
        error,
        success,
    };
    Ok((status, page).into_response())
}

async fn forget_session(session: &Session) -> Result<Response, AppError> {
    tracing::warn!("session refers to a missing user, logging out");
    clear_current_user(session).await?;
    Ok(Redirect::to("/login").into_response())
}
