//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password registration and login
//! - `catalog` - Cached product catalog and browse filtering
//! - `cart` - Cart operations for guests (session) and users (database)
//! - `favorites` - Favorites for guests (session) and users (database)
//! - `sync` - Guest session state and the merge on sign-in
//! - `checkout` - Totals and order placement
//! - `account` - Dashboard summary, addresses and order history
//! - `reviews` - Product reviews and rating summaries
//! - `admin` - User roles, product management and order status

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favorites;
pub mod reviews;
pub mod sync;

use thiserror::Error;

use essence_core::PaymentMethod;
use essence_core::cart::CartError;

use crate::db::RepositoryError;
use crate::models::{AddressError, ProductError, ReviewError};

/// Errors from storefront services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Cart mutation rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error(transparent)]
    InvalidReview(#[from] ReviewError),

    #[error(transparent)]
    InvalidProduct(#[from] ProductError),

    #[error("product not found")]
    ProductNotFound,

    #[error("address not found")]
    AddressNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("user not found")]
    UserNotFound,

    /// Checkout without a shipping address.
    #[error("Please select or add a shipping address")]
    AddressRequired,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("{0} is not available yet")]
    PaymentUnavailable(PaymentMethod),

    /// An admin tried to remove their own admin role.
    #[error("you cannot remove your own admin role")]
    SelfDemotion,
}
