//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::catalog::{self, Product};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::cart::{CART_COOKIE, Cart};

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price().to_string(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_login: Option<String>,
    pub products: Vec<ProductView>,
    pub cart_count: usize,
}

/// Display the product catalog.
pub async fn home(OptionalAuth(viewer): OptionalAuth, jar: CookieJar) -> impl IntoResponse {
    let cart = Cart::decode(jar.get(CART_COOKIE).map(Cookie::value));

    HomeTemplate {
        current_login: viewer.map(|u| u.login.into_inner()),
        products: catalog::products().iter().map(ProductView::from).collect(),
        cart_count: cart.len(),
    }
}
