//! Cookie-backed shopping cart.
//!
//! The cart is an ordered list of item ids held by the client in the `cart`
//! cookie as a JSON array. Duplicates are meaningful: each occurrence is one
//! unit. Nothing about the cart is stored server-side, so every decode
//! treats the cookie as untrusted input.

use corner_shop_core::ItemId;
use thiserror::Error;

/// Name of the cart cookie.
pub const CART_COOKIE: &str = "cart";

/// Encoded form of an empty cart.
pub const EMPTY_CART: &str = "[]";

/// Maximum number of entries a cart may hold.
pub const MAX_CART_ITEMS: usize = 100;

/// Cart codec errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cookie is not a JSON array of valid item ids within the bound.
    #[error("malformed cart: {0}")]
    Malformed(String),

    /// Adding would exceed the entry bound.
    #[error("cart is full (at most {max} items)")]
    Full {
        /// Maximum allowed entries.
        max: usize,
    },
}

/// An ordered list of cart entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<ItemId>,
}

impl Cart {
    /// Decode a cart cookie strictly.
    ///
    /// A missing or blank cookie is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Malformed` if the value is not a JSON array of
    /// valid item ids, or holds more than [`MAX_CART_ITEMS`] entries.
    pub fn try_decode(cookie: Option<&str>) -> Result<Self, CartError> {
        let raw = match cookie.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(raw) => raw,
        };

        let items: Vec<ItemId> =
            serde_json::from_str(raw).map_err(|e| CartError::Malformed(e.to_string()))?;

        if items.len() > MAX_CART_ITEMS {
            return Err(CartError::Malformed(format!(
                "{} entries exceeds limit of {MAX_CART_ITEMS}",
                items.len()
            )));
        }

        Ok(Self { items })
    }

    /// Decode a cart cookie, recovering from malformed input with an empty cart.
    #[must_use]
    pub fn decode(cookie: Option<&str>) -> Self {
        Self::try_decode(cookie).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable cart cookie");
            Self::default()
        })
    }

    /// Encode the cart as a JSON array.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| EMPTY_CART.to_string())
    }

    /// Append an item, keeping order and duplicates.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Full` if the cart already holds [`MAX_CART_ITEMS`]
    /// entries; the cart is left unchanged.
    pub fn add_item(&mut self, item: ItemId) -> Result<(), CartError> {
        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CartError::Full {
                max: MAX_CART_ITEMS,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove the first occurrence of `item`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_item(&mut self, item: &ItemId) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Group entries into `(item, count)` lines in first-seen order.
    #[must_use]
    pub fn quantities(&self) -> Vec<(&ItemId, u32)> {
        let mut lines: Vec<(&ItemId, u32)> = Vec::new();
        for item in &self.items {
            match lines.iter_mut().find(|(seen, _)| *seen == item) {
                Some((_, count)) => *count += 1,
                None => lines.push((item, 1)),
            }
        }
        lines
    }

    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> ItemId {
        ItemId::parse(s).unwrap()
    }

    fn cart_of(ids: &[&str]) -> Cart {
        let mut cart = Cart::default();
        for i in ids {
            cart.add_item(id(i)).unwrap();
        }
        cart
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let cart = cart_of(&["a", "b"]);
        assert_eq!(cart.encode(), r#"["a","b"]"#);
        assert_eq!(Cart::decode(Some(&cart.encode())), cart);
    }

    #[test]
    fn test_empty_or_missing_cookie_is_empty_cart() {
        assert!(Cart::decode(None).is_empty());
        assert!(Cart::decode(Some("")).is_empty());
        assert!(Cart::decode(Some(EMPTY_CART)).is_empty());
        assert_eq!(Cart::default().encode(), EMPTY_CART);
    }

    #[test]
    fn test_malformed_cookie_recovers_to_empty_cart() {
        for raw in [
            "not json",
            "{\"a\":1}",
            "[1,2,3]",
            "[\"ok\", \"<script>\"]",
            "\"apple\"",
        ] {
            assert!(
                matches!(Cart::try_decode(Some(raw)), Err(CartError::Malformed(_))),
                "{raw} should be rejected"
            );
            assert!(Cart::decode(Some(raw)).is_empty());
        }
    }

    #[test]
    fn test_oversized_cookie_is_malformed() {
        let ids: Vec<String> = (0..=MAX_CART_ITEMS).map(|_| "\"a\"".to_string()).collect();
        let raw = format!("[{}]", ids.join(","));
        assert!(matches!(
            Cart::try_decode(Some(&raw)),
            Err(CartError::Malformed(_))
        ));
    }

    #[test]
    fn test_add_then_remove_restores_cart() {
        let original = cart_of(&["a", "b"]);
        let mut cart = original.clone();
        cart.add_item(id("x")).unwrap();
        assert!(cart.remove_item(&id("x")));
        assert_eq!(cart, original);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = cart_of(&["a"]);
        assert!(!cart.remove_item(&id("z")));
        assert_eq!(cart, cart_of(&["a"]));
    }

    #[test]
    fn test_remove_takes_first_occurrence_only() {
        let mut cart = cart_of(&["a", "b", "a"]);
        cart.remove_item(&id("a"));
        assert_eq!(cart, cart_of(&["b", "a"]));
    }

    #[test]
    fn test_duplicates_become_quantities() {
        let cart = cart_of(&["tea", "milk", "tea", "tea"]);
        let lines: Vec<(&str, u32)> = cart
            .quantities()
            .into_iter()
            .map(|(item, n)| (item.as_str(), n))
            .collect();
        assert_eq!(lines, [("tea", 3), ("milk", 1)]);
        assert_eq!(cart.len(), 4);
    }

    #[test]
    fn test_add_beyond_bound_fails_unchanged() {
        let mut cart = Cart::default();
        for _ in 0..MAX_CART_ITEMS {
            cart.add_item(id("a")).unwrap();
        }
        let before = cart.clone();
        assert!(matches!(
            cart.add_item(id("b")),
            Err(CartError::Full { max: MAX_CART_ITEMS })
        ));
        assert_eq!(cart, before);
    }
}
