//! Checkout: totals preview and order placement.
//!
//! Prices always come from the database at the moment of checkout. The order,
//! its items and the emptied cart are written in a single transaction.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use essence_core::pricing::{CheckoutTotals, PricingRules};
use essence_core::{AddressId, PaymentMethod, UserId};

use super::ServiceError;
use crate::db::orders::{self, NewOrder};
use crate::db::{AddressRepository, RepositoryError, cart};
use crate::models::{CartView, Notice, Order, ShippingAddress};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Longest accepted order note.
const MAX_ORDER_NOTES_LENGTH: usize = 1000;

/// Checkout form.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_notes: Option<String>,
}

/// Cart plus the totals an order would be charged.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub cart: CartView,
    pub totals: CheckoutTotals,
    pub free_shipping: bool,
}

/// A placed order and its confirmation notice.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub notice: Notice,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    state: &'a AppState,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn rules(&self) -> &PricingRules {
        &self.state.config().pricing
    }

    /// Totals for the user's current cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the cart cannot be read.
    pub async fn summary(
        &self,
        session: &tower_sessions::Session,
        user_id: UserId,
    ) -> Result<CheckoutSummary, ServiceError> {
        let cart = CartService::new(self.state, session, Some(user_id))
            .load()
            .await?;
        let totals = CheckoutTotals::compute(
            cart.items
                .iter()
                .map(|item| (item.product.price, item.quantity)),
            self.rules(),
        );

        Ok(CheckoutSummary {
            free_shipping: totals.ships_free(),
            cart,
            totals,
        })
    }

    /// Place an order for everything in the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::AddressRequired` without an address,
    /// `ServiceError::AddressNotFound` for an address the user does not own,
    /// `ServiceError::PaymentUnavailable` for an unsupported payment method and
    /// `ServiceError::EmptyCart` when there is nothing to buy.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, ServiceError> {
        let address_id = request.address_id.ok_or(ServiceError::AddressRequired)?;
        if !request.payment_method.is_available() {
            return Err(ServiceError::PaymentUnavailable(request.payment_method));
        }

        let pool = self.state.pool();
        let address = AddressRepository::new(pool)
            .get(user_id, address_id)
            .await?
            .ok_or(ServiceError::AddressNotFound)?;

        let mut tx = pool.begin().await.map_err(RepositoryError::from)?;

        let lines = cart::list_for_checkout_in(&mut *tx, user_id).await?;
        if lines.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let totals = CheckoutTotals::compute(
            lines.iter().map(|(product, quantity)| (product.price, *quantity)),
            self.rules(),
        );

        let new_order = NewOrder {
            user_id,
            totals,
            shipping_address: ShippingAddress::from(&address),
            payment_method: request.payment_method,
            order_notes: normalize_notes(request.order_notes),
            lines: lines
                .into_iter()
                .map(|(product, quantity)| (product.id, product.name, quantity, product.price))
                .collect(),
        };

        let order = orders::create_in(&mut *tx, &new_order).await?;
        cart::clear_in(&mut *tx, user_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            order_id = %order.id,
            total = %order.total_amount,
            items = order.item_count(),
            "Order placed"
        );

        let notice = Notice::order_placed(order.id, order.total_amount);
        Ok(PlacedOrder { order, notice })
    }
}

/// Trim notes, dropping blank ones.
fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().chars().take(MAX_ORDER_NOTES_LENGTH).collect::<String>())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_cash_on_delivery() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{"address_id": "a1b2c3d4-0000-4000-8000-000000000001"}"#,
        )
        .unwrap();
        assert_eq!(request.payment_method, PaymentMethod::CashOnDelivery);
        assert!(request.order_notes.is_none());
    }

    #[test]
    fn test_request_accepts_credit_card_for_rejection_later() {
        let request: CheckoutRequest =
            serde_json::from_str(r#"{"address_id": null, "payment_method": "credit_card"}"#)
                .unwrap();
        assert_eq!(request.payment_method, PaymentMethod::CreditCard);
        assert!(!request.payment_method.is_available());
    }

    #[test]
    fn test_notes_are_trimmed() {
        assert_eq!(
            normalize_notes(Some("  leave at door ".to_string())).as_deref(),
            Some("leave at door")
        );
        assert_eq!(normalize_notes(Some("   ".to_string())), None);
    }
}
