//! Corner Shop Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront and the CLI:
//! - `storefront` - Public web application (catalog, cart, accounts)
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only validated newtypes - no I/O, no database
//! access, no HTTP. SQLite encoding is opt-in via the `sqlite` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, logins, item identifiers and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
