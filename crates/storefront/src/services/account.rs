//! Account dashboard, saved addresses and order history.

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use essence_core::{AddressId, AppRole, OrderId, Price, UserId};

use super::ServiceError;
use crate::db::{
    AddressRepository, CartRepository, OrderRepository, RepositoryError, UserRepository,
    WishlistRepository,
};
use crate::models::{Address, NewAddress, Notice, Order, Profile};

/// Number of orders shown on the dashboard.
pub const RECENT_ORDER_COUNT: usize = 3;

/// Everything the account dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub profile: Profile,
    pub role: AppRole,
    pub order_count: u32,
    pub total_spent: Price,
    pub recent_orders: Vec<Order>,
    pub favorites_count: u32,
    pub cart_count: u32,
}

/// A saved address and its notice.
#[derive(Debug, Clone, Serialize)]
pub struct SavedAddress {
    pub address: Address,
    pub notice: Notice,
}

/// Account service for a signed-in user.
pub struct AccountService<'a> {
    pool: &'a PgPool,
    user_id: UserId,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, user_id: UserId) -> Self {
        Self { pool, user_id }
    }

    /// Dashboard data.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::UserNotFound` if the profile was deleted.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn summary(&self) -> Result<AccountSummary, ServiceError> {
        let users = UserRepository::new(self.pool);
        let profile = users
            .get_by_id(self.user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;
        let role = users.role(self.user_id).await?;

        let orders = OrderRepository::new(self.pool);
        let stats = orders.stats(self.user_id).await?;
        let mut recent_orders = orders.list_for_user(self.user_id).await?;
        recent_orders.truncate(RECENT_ORDER_COUNT);

        let favorites_count = WishlistRepository::new(self.pool)
            .count(self.user_id)
            .await?;
        let cart_count = CartRepository::new(self.pool).count(self.user_id).await?;

        Ok(AccountSummary {
            profile,
            role,
            order_count: stats.order_count,
            total_spent: stats.total_spent,
            recent_orders,
            favorites_count,
            cart_count,
        })
    }

    /// Saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn addresses(&self) -> Result<Vec<Address>, ServiceError> {
        Ok(AddressRepository::new(self.pool).list(self.user_id).await?)
    }

    /// Validate and save an address.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidAddress` when a required field is blank.
    #[instrument(skip(self, address), fields(user_id = %self.user_id))]
    pub async fn add_address(&self, address: NewAddress) -> Result<SavedAddress, ServiceError> {
        let address = address.validate()?;
        let address = AddressRepository::new(self.pool)
            .create(self.user_id, &address)
            .await?;

        Ok(SavedAddress {
            address,
            notice: Notice::address_saved(),
        })
    }

    /// Make an address the default.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::AddressNotFound` if the user doesn't own it.
    pub async fn set_default_address(&self, id: AddressId) -> Result<Vec<Address>, ServiceError> {
        let addresses = AddressRepository::new(self.pool);
        addresses
            .set_default(self.user_id, id)
            .await
            .map_err(not_found_as(ServiceError::AddressNotFound))?;
        Ok(addresses.list(self.user_id).await?)
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::AddressNotFound` if the user doesn't own it.
    pub async fn delete_address(&self, id: AddressId) -> Result<Vec<Address>, ServiceError> {
        let addresses = AddressRepository::new(self.pool);
        addresses
            .delete(self.user_id, id)
            .await
            .map_err(not_found_as(ServiceError::AddressNotFound))?;
        Ok(addresses.list(self.user_id).await?)
    }

    /// Order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the query fails.
    pub async fn orders(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(OrderRepository::new(self.pool)
            .list_for_user(self.user_id)
            .await?)
    }

    /// A single order the user placed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::OrderNotFound` for someone else's order.
    pub async fn order(&self, id: OrderId) -> Result<Order, ServiceError> {
        OrderRepository::new(self.pool)
            .get_for_user(self.user_id, id)
            .await?
            .ok_or(ServiceError::OrderNotFound)
    }
}

/// Map `RepositoryError::NotFound` to a specific service error.
pub(crate) fn not_found_as(error: ServiceError) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| match e {
        RepositoryError::NotFound => error,
        other => ServiceError::Repository(other),
    }
}
