//! Cart route handlers.
//!
//! The cart lives entirely in the `cart` cookie. Each handler decodes it,
//! applies the change and writes the re-encoded value back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use corner_shop_core::{CurrencyCode, ItemId, Price};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::cart::{CART_COOKIE, Cart};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Option<String>,
    pub line_price: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub current_login: Option<String>,
    pub lines: Vec<CartLineView>,
    pub item_count: usize,
    pub total: String,
}

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub item: String,
}

// =============================================================================
// Cookie Helpers
// =============================================================================

/// Decode the cart cookie.
///
/// The flag is true when the cookie was absent or unreadable and should be
/// rewritten with the decoded value.
#[must_use]
pub fn read_cart(jar: &CookieJar) -> (Cart, bool) {
    let raw = jar.get(CART_COOKIE).map(Cookie::value);
    match Cart::try_decode(raw) {
        Ok(cart) => (cart, raw.is_none()),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable cart cookie");
            (Cart::default(), true)
        }
    }
}

/// Build the cart cookie for a response.
#[must_use]
pub fn cart_cookie(cart: &Cart, secure: bool) -> Cookie<'static> {
    Cookie::build((CART_COOKIE, cart.encode()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(secure)
        .build()
}

fn cart_lines(cart: &Cart) -> (Vec<CartLineView>, Price) {
    let mut total = Price::zero(CurrencyCode::USD);
    let lines = cart
        .quantities()
        .into_iter()
        .map(|(item, quantity)| match catalog::find(item) {
            Some(product) => {
                let line_price = product.price() * quantity;
                total = total + line_price;
                CartLineView {
                    id: item.to_string(),
                    name: product.name.to_string(),
                    quantity,
                    unit_price: Some(product.price().to_string()),
                    line_price: Some(line_price.to_string()),
                }
            }
            None => CartLineView {
                id: item.to_string(),
                name: item.to_string(),
                quantity,
                unit_price: None,
                line_price: None,
            },
        })
        .collect();
    (lines, total)
}

// =============================================================================
// Routes
// =============================================================================

/// Display the cart page.
///
/// A missing or unreadable cookie is reset to an empty cart.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    jar: CookieJar,
) -> impl IntoResponse {
    let (cart, reset) = read_cart(&jar);
    let (lines, total) = cart_lines(&cart);

    let jar = if reset {
        jar.add(cart_cookie(&cart, state.config().secure_cookies()))
    } else {
        jar
    };

    let page = CartShowTemplate {
        current_login: viewer.map(|u| u.login.into_inner()),
        lines,
        item_count: cart.len(),
        total: total.to_string(),
    };
    (jar, page)
}

/// Add one unit of a catalog item.
///
/// Unknown items and a full cart are rejected with 400.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CartItemForm>,
) -> Result<Response, AppError> {
    let item = ItemId::parse(form.item.trim())
        .map_err(|e| AppError::BadRequest(format!("invalid item: {e}")))?;
    if catalog::find(&item).is_none() {
        return Err(AppError::BadRequest(format!("unknown item: {item}")));
    }

    let (mut cart, _) = read_cart(&jar);
    cart.add_item(item.clone())?;
    add_breadcrumb("cart", "Added item", &[("item", item.as_str())]);
    tracing::debug!(item = %item, size = cart.len(), "added to cart");

    let jar = jar.add(cart_cookie(&cart, state.config().secure_cookies()));
    Ok((jar, Redirect::to("/cart")).into_response())
}

/// Remove one unit of an item. Absent items leave the cart unchanged.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CartItemForm>,
) -> Response {
    let (mut cart, _) = read_cart(&jar);

    if let Ok(item) = ItemId::parse(form.item.trim()) {
        if cart.remove_item(&item) {
            add_breadcrumb("cart", "Removed item", &[("item", item.as_str())]);
        }
    }

    let jar = jar.add(cart_cookie(&cart, state.config().secure_cookies()));
    (jar, Redirect::to("/cart")).into_response()
}
