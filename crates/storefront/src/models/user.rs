//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use corner_shop_core::{Login, UserId};

/// A registered storefront account.
///
/// The password hash is deliberately absent; it is only ever read alongside
/// the user by [`crate::db::UserRepository::get_password_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub login: Login,
    /// Profile fields captured at registration.
    pub profile: Profile,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated (password change).
    pub updated_at: DateTime<Utc>,
}

/// Free-form profile fields.
///
/// `birth_date` is either empty or an ISO `YYYY-MM-DD` date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
}

impl Profile {
    /// Full display name, or `None` when both name fields are empty.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let profile = Profile {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            birth_date: String::new(),
        };
        assert_eq!(profile.display_name().as_deref(), Some("Ada Lovelace"));

        let only_last = Profile {
            last_name: "Hopper".to_string(),
            ..Profile::default()
        };
        assert_eq!(only_last.display_name().as_deref(), Some("Hopper"));

        assert_eq!(Profile::default().display_name(), None);
    }
}
