//! Account login name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Login`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The input string is empty.
    #[error("login cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("login must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("login contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A unique account login name.
///
/// ## Constraints
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `.`, `_` and `-`
///
/// Logins are case-sensitive: `Alice` and `alice` are distinct accounts.
///
/// ## Examples
///
/// ```
/// use corner_shop_core::Login;
///
/// assert!(Login::parse("alice").is_ok());
/// assert!(Login::parse("bob_smith-1.2").is_ok());
///
/// assert!(Login::parse("").is_err());
/// assert!(Login::parse("with space").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Login(String);

impl Login {
    /// Maximum length of a login.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Login` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 64 characters,
    /// or contains a character other than ASCII alphanumerics, `.`, `_`, `-`.
    pub fn parse(s: &str) -> Result<Self, LoginError> {
        if s.is_empty() {
            return Err(LoginError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(LoginError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(LoginError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the login as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Login` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Login {
    type Err = LoginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Login {
    type Error = LoginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Login> for String {
    fn from(login: Login) -> Self {
        login.0
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Login {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Login {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Login {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}
