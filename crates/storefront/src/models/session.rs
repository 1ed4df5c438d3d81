//! Session-related types.
//!
//! The browser only ever holds an opaque session id; the identity below lives
//! server-side in the session store.

use serde::{Deserialize, Serialize};

use corner_shop_core::{Login, UserId};

use super::user::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub login: Login,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
