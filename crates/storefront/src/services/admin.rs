//! Admin panel operations.
//!
//! Callers must already have checked the admin role.

use serde::Serialize;
use tracing::{info, instrument};

use essence_core::catalog::Product;
use essence_core::{AppRole, OrderId, OrderStatus, ProductId, UserId};

use super::ServiceError;
use super::account::not_found_as;
use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::models::{Notice, Order, ProductInput, ProductView, UserWithRole};
use crate::state::AppState;

/// Role change confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct RoleChange {
    pub user_id: UserId,
    pub role: AppRole,
    pub notice: Notice,
}

/// Admin service, acting as `admin_id`.
pub struct AdminService<'a> {
    state: &'a AppState,
    admin_id: UserId,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState, admin_id: UserId) -> Self {
        Self { state, admin_id }
    }

    /// All users with their roles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn users(&self) -> Result<Vec<UserWithRole>, ServiceError> {
        Ok(UserRepository::new(self.state.pool())
            .list_with_roles()
            .await?)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::SelfDemotion` when an admin demotes themselves
    /// and `ServiceError::UserNotFound` for an unknown user.
    #[instrument(skip(self), fields(admin_id = %self.admin_id))]
    pub async fn set_role(&self, user_id: UserId, role: AppRole) -> Result<RoleChange, ServiceError> {
        if user_id == self.admin_id && !role.is_admin() {
            return Err(ServiceError::SelfDemotion);
        }

        UserRepository::new(self.state.pool())
            .set_role(user_id, role)
            .await
            .map_err(not_found_as(ServiceError::UserNotFound))?;

        info!(%user_id, %role, "User role updated");
        Ok(RoleChange {
            user_id,
            role,
            notice: Notice::role_updated(),
        })
    }

    /// Every product, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the catalog cannot be read.
    pub async fn products(&self) -> Result<Vec<ProductView>, ServiceError> {
        let products = ProductRepository::new(self.state.pool()).list_all().await?;
        Ok(ProductView::list(&products))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidProduct` when validation fails.
    #[instrument(skip(self, input), fields(admin_id = %self.admin_id))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, ServiceError> {
        let product = input.validate()?;
        let product = ProductRepository::new(self.state.pool())
            .create(&product)
            .await?;
        self.state.catalog().invalidate().await;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidProduct` when validation fails and
    /// `ServiceError::ProductNotFound` for an unknown product.
    #[instrument(skip(self, input), fields(admin_id = %self.admin_id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, ServiceError> {
        let product = input.validate()?;
        let product = ProductRepository::new(self.state.pool())
            .update(id, &product)
            .await
            .map_err(not_found_as(ServiceError::ProductNotFound))?;
        self.state.catalog().invalidate().await;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ProductNotFound` for an unknown product.
    #[instrument(skip(self), fields(admin_id = %self.admin_id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        ProductRepository::new(self.state.pool())
            .delete(id)
            .await
            .map_err(not_found_as(ServiceError::ProductNotFound))?;
        self.state.catalog().invalidate().await;

        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn orders(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(OrderRepository::new(self.state.pool()).list_all().await?)
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::OrderNotFound` for an unknown order.
    #[instrument(skip(self), fields(admin_id = %self.admin_id))]
    pub async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ServiceError> {
        OrderRepository::new(self.state.pool())
            .update_status(id, status)
            .await
            .map_err(not_found_as(ServiceError::OrderNotFound))?;

        info!(order_id = %id, %status, "Order status updated");
        Ok(())
    }
}
