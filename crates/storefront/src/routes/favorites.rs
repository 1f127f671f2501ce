//! Favorites (wishlist) route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use essence_core::ProductId;

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::ProductView;
use crate::services::favorites::{FavoriteToggle, FavoritesService};
use crate::state::AppState;

/// Whether one product is a favorite.
#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub product_id: ProductId,
    pub favorite: bool,
}

/// Favorite products, most recently added first.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Vec<ProductView>>> {
    let favorites = FavoritesService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(favorites.list().await?))
}

/// Add or remove a product.
#[instrument(skip(state, session, user))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<FavoriteToggle>> {
    let favorites = FavoritesService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(favorites.toggle(product_id).await?))
}

/// Favorite status for a product.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<FavoriteStatus>> {
    let favorites = FavoritesService::new(&state, &session, user.map(|u| u.id));
    Ok(Json(FavoriteStatus {
        product_id,
        favorite: favorites.is_favorite(product_id).await?,
    }))
}
