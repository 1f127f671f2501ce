//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::checkout::{CheckoutRequest, CheckoutService, CheckoutSummary, PlacedOrder};
use crate::state::AppState;

/// Cart and totals for the checkout page.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutSummary>> {
    let checkout = CheckoutService::new(&state);
    Ok(Json(checkout.summary(&session, user.id).await?))
}

/// Place an order for the whole cart.
#[instrument(skip(state, user, request))]
pub async fn place_order(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let user = user.ok_or_else(|| {
        AppError::Unauthorized("You need to be logged in to place an order".to_string())
    })?;

    let placed = CheckoutService::new(&state)
        .place_order(user.id, request)
        .await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &placed.order.id.to_string())]),
    );
    Ok((StatusCode::CREATED, Json(placed)))
}
