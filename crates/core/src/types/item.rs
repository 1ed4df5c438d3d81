//! Catalog item identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`ItemId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemIdError {
    /// The input string is empty.
    #[error("item id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("item id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside the allowed set.
    #[error("item id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Identifier of a catalog item, as carried in the cart cookie.
///
/// Item ids are short slugs (`coffee-beans`, `tea_green`): 1-64 ASCII
/// alphanumerics, `-` or `_`. Deserialization validates, so a decoded cart
/// never holds an id that could not have been produced by [`ItemId::parse`].
///
/// ```
/// use corner_shop_core::ItemId;
///
/// assert!(ItemId::parse("coffee-beans").is_ok());
/// assert!(ItemId::parse("<script>").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Maximum length of an item id.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an `ItemId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains a
    /// character other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, ItemIdError> {
        if s.is_empty() {
            return Err(ItemIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(ItemIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')))
        {
            return Err(ItemIdError::InvalidCharacter(c));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
