//! User directory route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::state::AppState;

/// User display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub login: String,
    pub name: Option<String>,
    pub birth_date: String,
    pub member_since: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            login: user.login.to_string(),
            name: user.profile.display_name(),
            birth_date: user.profile.birth_date.clone(),
            member_since: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// User list page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/list.html")]
pub struct UserListTemplate {
    pub current_login: Option<String>,
    pub users: Vec<UserView>,
}

/// List registered users. Requires a logged-in session.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current_user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let users = state.auth().list_users().await?;

    Ok(UserListTemplate {
        current_login: Some(current_user.login.into_inner()),
        users: users.iter().map(UserView::from).collect(),
    })
}
