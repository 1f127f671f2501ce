//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use essence_core::{OrderId, OrderItemId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

use super::Address;

/// Address copied onto the order at checkout.
///
/// Stored as JSON so later edits to the saved address do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl From<&Address> for ShippingAddress {
    fn from(address: &Address) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.clone(),
            address_line_1: address.address_line_1.clone(),
            address_line_2: address.address_line_2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

/// A line on a placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    /// Current product name; `None` if the product was since deleted.
    pub product_name: Option<String>,
    pub quantity: u32,
    /// Price at the time of purchase.
    pub unit_price: Price,
    pub line_total: Price,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub total_amount: Price,
    pub shipping_cost: Price,
    pub tax_amount: Price,
    pub shipping_address: ShippingAddress,
    pub order_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Customer-facing reference (first eight characters of the id).
    #[must_use]
    pub fn reference(&self) -> String {
        self.id.short_ref()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
