//! Guest shopping state and the merge into a user's account on sign-in.
//!
//! Anonymous visitors keep their cart and favorites in the session. When they
//! log in or register, both are folded into the database in one transaction
//! and removed from the session.

use serde::Serialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::{info, instrument};

use essence_core::UserId;
use essence_core::cart::CartState;
use essence_core::favorites::FavoriteSet;

use super::ServiceError;
use crate::db::{RepositoryError, cart, wishlist};
use crate::models::session_keys;

/// Read the guest cart, empty if none.
///
/// # Errors
///
/// Returns `ServiceError::Session` if the session store fails.
pub async fn guest_cart(session: &Session) -> Result<CartState, ServiceError> {
    Ok(session
        .get::<CartState>(session_keys::GUEST_CART)
        .await?
        .unwrap_or_default())
}

/// Store the guest cart.
///
/// # Errors
///
/// Returns `ServiceError::Session` if the session store fails.
pub async fn save_guest_cart(session: &Session, cart: &CartState) -> Result<(), ServiceError> {
    session.insert(session_keys::GUEST_CART, cart).await?;
    Ok(())
}

/// Read the guest favorites, empty if none.
///
/// # Errors
///
/// Returns `ServiceError::Session` if the session store fails.
pub async fn guest_favorites(session: &Session) -> Result<FavoriteSet, ServiceError> {
    Ok(session
        .get::<FavoriteSet>(session_keys::GUEST_FAVORITES)
        .await?
        .unwrap_or_default())
}

/// Store the guest favorites.
///
/// # Errors
///
/// Returns `ServiceError::Session` if the session store fails.
pub async fn save_guest_favorites(
    session: &Session,
    favorites: &FavoriteSet,
) -> Result<(), ServiceError> {
    session.insert(session_keys::GUEST_FAVORITES, favorites).await?;
    Ok(())
}

/// What a sign-in merge carried over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub cart_lines: usize,
    pub favorites: usize,
}

/// Move the session's guest cart and favorites into the user's account.
///
/// Cart quantities add up, capped at the line maximum. Favorites are inserted
/// and duplicates ignored. Products deleted since they were added are dropped.
///
/// # Errors
///
/// Returns `ServiceError` if the session or the database fails. Nothing is
/// written when the transaction fails, and the session keeps its guest state.
#[instrument(skip(pool, session), fields(user_id = %user_id))]
pub async fn merge_guest_state(
    pool: &PgPool,
    session: &Session,
    user_id: UserId,
) -> Result<MergeReport, ServiceError> {
    let mut guest_cart = guest_cart(session).await?;
    let mut guest_favorites = guest_favorites(session).await?;

    if guest_cart.is_empty() && guest_favorites.is_empty() {
        return Ok(MergeReport::default());
    }

    let lines = guest_cart.drain();
    let favorites = guest_favorites.drain();

    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;
    for line in &lines {
        cart::merge_line_in(&mut *tx, user_id, line.product_id, line.quantity).await?;
    }
    for product_id in &favorites {
        wishlist::insert_in(&mut *tx, user_id, *product_id).await?;
    }
    tx.commit().await.map_err(RepositoryError::from)?;

    session
        .remove::<CartState>(session_keys::GUEST_CART)
        .await?;
    session
        .remove::<FavoriteSet>(session_keys::GUEST_FAVORITES)
        .await?;

    let report = MergeReport {
        cart_lines: lines.len(),
        favorites: favorites.len(),
    };
    info!(
        cart_lines = report.cart_lines,
        favorites = report.favorites,
        "Merged guest state into account"
    );
    Ok(report)
}
