//! Domain models for the storefront.
//!
//! - [`user`] - Registered accounts and their profile fields
//! - [`session`] - Identity stored in the server-side session

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{Profile, User};
