//! Essence Core - Shared domain types and storefront logic.
//!
//! This crate is shared by:
//! - `storefront` - Public JSON API for the fragrance shop
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no database access,
//! no HTTP clients. The storefront keeps an anonymous visitor's cart and
//! favorites in the session using the models defined here, and uses the same
//! models to merge them into the persistent tables on sign-in.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, display IDs, prices, emails, and statuses
//! - [`cart`] - In-memory cart model
//! - [`favorites`] - In-memory favorites model
//! - [`pricing`] - Checkout totals (shipping and tax)
//! - [`catalog`] - Product filtering and category listing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod pricing;
pub mod types;

pub use types::*;
