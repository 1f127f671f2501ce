//! Cart route handlers.
//!
//! Anonymous visitors keep their cart in the session; signed-in users keep it
//! in the database. Both paths go through `CartService`.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use essence_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::OptionalAuth;
use crate::models::CartView;
use crate::services::cart::{CartService, CartUpdate};
use crate::state::AppState;

/// Body for adding a product.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
}

/// Body for setting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: u32,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Show the current cart.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(cart.load().await?))
}

/// Add one unit of a product.
#[instrument(skip(state, session, user, body), fields(product_id = %body.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(body): Json<AddToCart>,
) -> Result<Json<CartUpdate>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    let update = cart.add(body.product_id).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &body.product_id.to_string())]),
    );
    Ok(Json(update))
}

/// Set a line's quantity. Zero removes it.
#[instrument(skip(state, session, user, body), fields(quantity = body.quantity))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantity>,
) -> Result<Json<CartView>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(cart.update_quantity(product_id, body.quantity).await?))
}

/// Remove a line.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartUpdate>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(cart.remove(product_id).await?))
}

/// Empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartUpdate>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(cart.clear().await?))
}

/// Total units in the cart, for the header badge.
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartCount>> {
    let cart = CartService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(CartCount {
        count: cart.count().await?,
    }))
}
