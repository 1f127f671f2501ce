//! Admin panel route handlers.
//!
//! Every handler takes `RequireAdmin`, which checks the role in the database.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use essence_core::catalog::Product;
use essence_core::{AppRole, OrderId, OrderStatus, ProductId, UserId};

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{Order, ProductInput, ProductView, UserWithRole};
use crate::services::admin::{AdminService, RoleChange};
use crate::state::AppState;

/// Body for a role change.
#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: AppRole,
}

/// Body for an order status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

// =============================================================================
// Users
// =============================================================================

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<UserWithRole>>> {
    Ok(Json(AdminService::new(&state, admin.id).users().await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<UserId>,
    Json(body): Json<RoleUpdate>,
) -> Result<Json<RoleChange>> {
    let change = AdminService::new(&state, admin.id)
        .set_role(user_id, body.role)
        .await?;
    Ok(Json(change))
}

// =============================================================================
// Products
// =============================================================================

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(AdminService::new(&state, admin.id).products().await?))
}

#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = AdminService::new(&state, admin.id)
        .create_product(input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let product = AdminService::new(&state, admin.id)
        .update_product(id, input)
        .await?;
    Ok(Json(product))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    AdminService::new(&state, admin.id).delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(AdminService::new(&state, admin.id).orders().await?))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn set_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<StatusCode> {
    AdminService::new(&state, admin.id)
        .set_order_status(id, body.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
