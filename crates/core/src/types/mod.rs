//! Core types for Corner Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod item;
pub mod login;
pub mod price;

pub use id::*;
pub use item::{ItemId, ItemIdError};
pub use login::{Login, LoginError};
pub use price::{CurrencyCode, Price};
