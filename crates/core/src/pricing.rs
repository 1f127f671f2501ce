//! Checkout pricing: subtotal, shipping and tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Price;

/// Shipping and tax parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingRules {
    /// Orders with a subtotal strictly above this ship free.
    pub free_shipping_threshold: Price,
    /// Shipping charged at or below the threshold.
    pub flat_shipping_rate: Price,
    /// Fraction of the subtotal charged as tax.
    pub tax_rate: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Price::from_cents(10_000),
            flat_shipping_rate: Price::from_cents(999),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

/// Computed order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl CheckoutTotals {
    /// Compute totals for `(unit price, quantity)` lines.
    #[must_use]
    pub fn compute<I>(lines: I, rules: &PricingRules) -> Self
    where
        I: IntoIterator<Item = (Price, u32)>,
    {
        let subtotal: Price = lines
            .into_iter()
            .map(|(price, quantity)| price * quantity)
            .sum();
        let subtotal = subtotal.round_to_cents();

        let shipping = if subtotal > rules.free_shipping_threshold {
            Price::ZERO
        } else {
            rules.flat_shipping_rate
        };
        let tax = subtotal.apply_rate(rules.tax_rate);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Whether this order qualifies for free shipping.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping == Price::ZERO
    }
}
