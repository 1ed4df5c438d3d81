//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password registration, login and password change
//! - `cart` - Cookie-backed cart codec

pub mod auth;
pub mod cart;

pub use auth::{AuthError, AuthService};
pub use cart::{Cart, CartError};
