//! Cart operations.
//!
//! Signed-in users' carts live in the `cart` table; anonymous visitors' carts
//! live in the session as a [`CartState`]. Handlers see the same API either way.

use serde::Serialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::instrument;

use essence_core::cart::{CartError, CartOutcome, CartState, MAX_LINE_QUANTITY};
use essence_core::{ProductId, UserId};

use super::catalog::{Catalog, CatalogCache};
use super::{ServiceError, sync};
use crate::db::CartRepository;
use crate::db::cart::Increment;
use crate::models::{CartItemView, CartView, Notice};
use crate::state::AppState;

/// A cart after a mutation, with the notice to show.
#[derive(Debug, Clone, Serialize)]
pub struct CartUpdate {
    pub cart: CartView,
    pub notice: Notice,
}

/// Cart service for the current visitor.
pub struct CartService<'a> {
    pool: &'a PgPool,
    catalog: &'a CatalogCache,
    session: &'a Session,
    user: Option<UserId>,
}

impl<'a> CartService<'a> {
    /// Cart of `user`, or of the anonymous session when `None`.
    #[must_use]
    pub fn new(state: &'a AppState, session: &'a Session, user: Option<UserId>) -> Self {
        Self {
            pool: state.pool(),
            catalog: state.catalog(),
            session,
            user,
        }
    }

    /// The cart with product details.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the cart or catalog cannot be read.
    pub async fn load(&self) -> Result<CartView, ServiceError> {
        let catalog = self.catalog.load(self.pool).await?;

        let items = match self.user {
            Some(user_id) => CartRepository::new(self.pool)
                .list(user_id)
                .await?
                .into_iter()
                .map(|(product, quantity)| CartItemView::new(catalog.view(&product), quantity))
                .collect(),
            None => guest_items(&catalog, &sync::guest_cart(self.session).await?),
        };

        Ok(CartView::new(items))
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ProductNotFound` for an unknown product and
    /// `ServiceError::Cart` when the line is already at its maximum.
    #[instrument(skip(self), fields(user_id = ?self.user))]
    pub async fn add(&self, product_id: ProductId) -> Result<CartUpdate, ServiceError> {
        let catalog = self.catalog.load(self.pool).await?;
        let product = catalog
            .get(product_id)
            .ok_or(ServiceError::ProductNotFound)?;

        let outcome = match self.user {
            Some(user_id) => match CartRepository::new(self.pool)
                .increment(user_id, product_id)
                .await
            {
                Ok(Increment::Inserted) => CartOutcome::Added,
                Ok(Increment::Incremented(_)) => CartOutcome::Incremented,
                Ok(Increment::AtLimit) => {
                    return Err(CartError::QuantityTooLarge {
                        max: MAX_LINE_QUANTITY,
                    }
                    .into());
                }
                Err(err) => return Err(self.catalog.product_write_error(err).await),
            },
            None => {
                let mut cart = sync::guest_cart(self.session).await?;
                let outcome = cart.add(product_id)?;
                sync::save_guest_cart(self.session, &cart).await?;
                outcome
            }
        };

        let notice = match outcome {
            CartOutcome::Added => Notice::added_to_cart(&product.name),
            CartOutcome::Incremented => Notice::cart_quantity_increased(&product.name),
        };

        Ok(CartUpdate {
            cart: self.load().await?,
            notice,
        })
    }

    /// Remove a product's line. Removing an absent line is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the cart cannot be written.
    #[instrument(skip(self), fields(user_id = ?self.user))]
    pub async fn remove(&self, product_id: ProductId) -> Result<CartUpdate, ServiceError> {
        match self.user {
            Some(user_id) => {
                CartRepository::new(self.pool)
                    .remove(user_id, product_id)
                    .await?;
            }
            None => {
                let mut cart = sync::guest_cart(self.session).await?;
                if cart.remove(product_id) {
                    sync::save_guest_cart(self.session, &cart).await?;
                }
            }
        }

        Ok(CartUpdate {
            cart: self.load().await?,
            notice: Notice::removed_from_cart(),
        })
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Cart` when the line does not exist or the
    /// quantity is above the maximum.
    #[instrument(skip(self), fields(user_id = ?self.user))]
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, ServiceError> {
        if quantity == 0 {
            return Ok(self.remove(product_id).await?.cart);
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            }
            .into());
        }

        match self.user {
            Some(user_id) => {
                let updated = CartRepository::new(self.pool)
                    .set_quantity(user_id, product_id, quantity)
                    .await?;
                if !updated {
                    return Err(CartError::NotInCart.into());
                }
            }
            None => {
                let mut cart = sync::guest_cart(self.session).await?;
                cart.update_quantity(product_id, quantity)?;
                sync::save_guest_cart(self.session, &cart).await?;
            }
        }

        self.load().await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the cart cannot be written.
    #[instrument(skip(self), fields(user_id = ?self.user))]
    pub async fn clear(&self) -> Result<CartUpdate, ServiceError> {
        match self.user {
            Some(user_id) => CartRepository::new(self.pool).clear(user_id).await?,
            None => {
                let mut cart = sync::guest_cart(self.session).await?;
                cart.clear();
                sync::save_guest_cart(self.session, &cart).await?;
            }
        }

        Ok(CartUpdate {
            cart: CartView::empty(),
            notice: Notice::cart_cleared(),
        })
    }

    /// Total units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the cart cannot be read.
    pub async fn count(&self) -> Result<u32, ServiceError> {
        match self.user {
            Some(user_id) => Ok(CartRepository::new(self.pool).count(user_id).await?),
            None => Ok(sync::guest_cart(self.session).await?.item_count()),
        }
    }
}

/// Resolve guest lines against the catalog. Lines for products that no
/// longer exist are skipped.
fn guest_items(catalog: &Catalog, cart: &CartState) -> Vec<CartItemView> {
    cart.lines()
        .iter()
        .filter_map(|line| {
            catalog
                .get(line.product_id)
                .map(|product| CartItemView::new(catalog.view(product), line.quantity))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use essence_core::Price;
    use essence_core::catalog::Product;

    use super::*;

    fn product(id: &str, cents: u32) -> Product {
        Product {
            id: id.parse().unwrap(),
            name: format!("Scent {cents}"),
            price: Price::from_cents(cents),
            image: None,
            description: None,
            category: "Floral".to_string(),
        }
    }

    #[test]
    fn test_guest_items_skip_deleted_products() {
        let kept = product("a1b2c3d4-0000-4000-8000-000000000001", 4_500);
        let deleted: ProductId = "a1b2c3d4-0000-4000-8000-000000000002".parse().unwrap();
        let catalog = Catalog::new(vec![kept.clone()]);

        let mut cart = CartState::new();
        cart.add(kept.id).unwrap();
        cart.add(kept.id).unwrap();
        cart.add(deleted).unwrap();

        let items = guest_items(&catalog, &cart);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].line_total, Price::from_cents(9_000));

        let view = CartView::new(items);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, Price::from_cents(9_000));
    }

    #[test]
    fn test_guest_lines_with_colliding_display_ids_stay_apart() {
        let a = product("a1b2c3d4-0000-4000-8000-000000000001", 1_000);
        let b = product("a1b2c3d4-ffff-4000-8000-000000000002", 2_000);
        let catalog = Catalog::new(vec![a.clone(), b.clone()]);

        let mut cart = CartState::new();
        cart.add(a.id).unwrap();
        cart.add(b.id).unwrap();

        let items = guest_items(&catalog, &cart);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product.id, items[1].product.id);
        assert_ne!(items[0].product.original_id, items[1].product.original_id);
    }
}
