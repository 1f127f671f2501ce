//! Account route handlers.
//!
//! These routes require authentication.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use essence_core::{AddressId, OrderId};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Address, NewAddress, Order};
use crate::services::account::{AccountService, AccountSummary, SavedAddress};
use crate::state::AppState;

/// Account dashboard: profile, order stats, recent orders and counts.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AccountSummary>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.summary().await?))
}

/// Saved addresses, default first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.addresses().await?))
}

/// Save a new address.
#[instrument(skip(state, user, address), fields(user_id = %user.id))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(address): Json<NewAddress>,
) -> Result<(StatusCode, Json<SavedAddress>)> {
    let account = AccountService::new(state.pool(), user.id);
    let saved = account.add_address(address).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Make an address the default. Returns the updated list.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.set_default_address(id).await?))
}

/// Delete an address. Returns the remaining list.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.delete_address(id).await?))
}

/// Order history, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.orders().await?))
}

/// A single order with its items.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let account = AccountService::new(state.pool(), user.id);
    Ok(Json(account.order(id).await?))
}
