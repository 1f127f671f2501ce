//! User-facing notices returned alongside mutations.

use serde::Serialize;

use essence_core::{OrderId, Price};

/// A short message the client may show as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }

    #[must_use]
    pub fn added_to_cart(product_name: &str) -> Self {
        Self::new(
            "Added to cart",
            format!("{product_name} has been added to your cart"),
        )
    }

    #[must_use]
    pub fn cart_quantity_increased(product_name: &str) -> Self {
        Self::new("Updated cart", format!("{product_name} quantity increased"))
    }

    #[must_use]
    pub fn removed_from_cart() -> Self {
        Self::new("Removed from cart", "Item has been removed from your cart")
    }

    #[must_use]
    pub fn cart_cleared() -> Self {
        Self::new("Cart cleared", "All items have been removed from your cart")
    }

    #[must_use]
    pub fn added_to_favorites() -> Self {
        Self::new("Added to favorites", "Item has been added to your favorites")
    }

    #[must_use]
    pub fn removed_from_favorites() -> Self {
        Self::new(
            "Removed from favorites",
            "Item has been removed from your favorites",
        )
    }

    #[must_use]
    pub fn address_saved() -> Self {
        Self::new("Address Saved", "Your address has been saved successfully")
    }

    #[must_use]
    pub fn order_placed(order_id: OrderId, total: Price) -> Self {
        Self::new(
            "Order Placed Successfully!",
            format!(
                "Your order #{} has been confirmed. Total: {}",
                order_id.short_ref(),
                total.display()
            ),
        )
    }

    #[must_use]
    pub fn role_updated() -> Self {
        Self::new("Success", "User role updated successfully")
    }
}
