//! Compiled-in product catalog.
//!
//! The shop sells a fixed list of items. Cart entries reference products by
//! [`ItemId`]; anything not listed here is rejected when adding to the cart.

use corner_shop_core::{CurrencyCode, ItemId, Price};

/// A product offered on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Slug used as the cart item id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description.
    pub description: &'static str,
    /// Unit price in cents.
    pub price_cents: i64,
}

impl Product {
    /// Unit price.
    #[must_use]
    pub fn price(&self) -> Price {
        Price::from_minor(self.price_cents, CurrencyCode::USD)
    }
}

static PRODUCTS: &[Product] = &[
    Product {
        id: "apple",
        name: "Apple",
        description: "Crisp orchard apple.",
        price_cents: 75,
    },
    Product {
        id: "bread",
        name: "Bread",
        description: "Sourdough loaf, baked this morning.",
        price_cents: 450,
    },
    Product {
        id: "cheese",
        name: "Cheese",
        description: "Aged cheddar, 200g.",
        price_cents: 699,
    },
    Product {
        id: "coffee",
        name: "Coffee",
        description: "Whole bean house roast, 250g.",
        price_cents: 1199,
    },
    Product {
        id: "milk",
        name: "Milk",
        description: "Whole milk, 1 litre.",
        price_cents: 189,
    },
    Product {
        id: "tea",
        name: "Tea",
        description: "Loose leaf breakfast tea, 100g.",
        price_cents: 525,
    },
];

/// All products in display order.
#[must_use]
pub fn products() -> &'static [Product] {
    PRODUCTS
}

/// Look up a product by item id.
#[must_use]
pub fn find(id: &ItemId) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_ids_are_valid_item_ids() {
        for product in products() {
            assert!(ItemId::parse(product.id).is_ok(), "{}", product.id);
        }
    }

    #[test]
    fn test_find() {
        let coffee = find(&ItemId::parse("coffee").unwrap()).unwrap();
        assert_eq!(coffee.name, "Coffee");
        assert_eq!(coffee.price().to_string(), "$11.99");

        assert!(find(&ItemId::parse("caviar").unwrap()).is_none());
    }
}
