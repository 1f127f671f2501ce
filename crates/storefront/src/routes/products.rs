//! Product catalog and review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use essence_core::ProductId;
use essence_core::catalog::{self, ProductFilter};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{NewReview, ProductView, Review};
use crate::services::catalog::CatalogListing;
use crate::services::reviews::{self, ProductReviews};
use crate::state::AppState;

/// List products matching the query filter.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<CatalogListing>> {
    let catalog = state.catalog().load(state.pool()).await?;
    Ok(Json(catalog.listing(&filter)))
}

/// Distinct category names, sorted.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let catalog = state.catalog().load(state.pool()).await?;
    Ok(Json(catalog::categories(catalog.products())))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let catalog = state.catalog().load(state.pool()).await?;
    let product = catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(catalog.view(product)))
}

/// Reviews for a product, newest first, with the rating summary.
#[instrument(skip(state))]
pub async fn reviews(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductReviews>> {
    Ok(Json(
        reviews::list(state.pool(), state.catalog(), id).await?,
    ))
}

/// Submit a review as the signed-in user.
#[instrument(skip(state, user, review), fields(user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(review): Json<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let review = reviews::submit(state.pool(), state.catalog(), &user, id, review).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
