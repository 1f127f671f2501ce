//! In-memory cart model.
//!
//! [`CartState`] holds an anonymous visitor's cart inside their session. Lines
//! are keyed by [`ProductId`] and keep insertion order. Product details are
//! resolved from the catalog when the cart is rendered.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("quantity cannot exceed {max}")]
    QuantityTooLarge { max: u32 },
    #[error("product is not in the cart")]
    NotInCart,
}

/// What [`CartState::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOutcome {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line's quantity went up by one.
    Incremented,
}

/// A product and its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Ordered collection of cart lines, at most one per product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityTooLarge` if the line is already full.
    pub fn add(&mut self, product_id: ProductId) -> Result<CartOutcome, CartError> {
        if let Some(line) = self.line_mut(product_id) {
            if line.quantity >= MAX_LINE_QUANTITY {
                return Err(CartError::QuantityTooLarge {
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity += 1;
            return Ok(CartOutcome::Incremented);
        }

        self.lines.push(CartLine {
            product_id,
            quantity: 1,
        });
        Ok(CartOutcome::Added)
    }

    /// Drop a product's line. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::QuantityTooLarge` above [`MAX_LINE_QUANTITY`] and
    /// `CartError::NotInCart` when there is no line to update.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            });
        }
        if quantity == 0 {
            return if self.remove(product_id) {
                Ok(())
            } else {
                Err(CartError::NotInCart)
            };
        }

        let line = self.line_mut(product_id).ok_or(CartError::NotInCart)?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Take the lines out, leaving the cart empty.
    pub fn drain(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

/// Combine two quantities for the same product, capped at [`MAX_LINE_QUANTITY`].
#[must_use]
pub fn merged_quantity(existing: u32, incoming: u32) -> u32 {
    existing.saturating_add(incoming).min(MAX_LINE_QUANTITY)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::DisplayId;

    fn pid(s: &str) -> ProductId {
        s.parse().unwrap()
    }

    #[test]
    fn test_add_new_then_existing() {
        let rose = ProductId::generate();
        let mut cart = CartState::new();

        assert_eq!(cart.add(rose).unwrap(), CartOutcome::Added);
        assert_eq!(cart.add(rose).unwrap(), CartOutcome::Incremented);
        assert_eq!(cart.quantity_of(rose), Some(2));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_respects_line_limit() {
        let oud = ProductId::generate();
        let mut cart = CartState::new();
        cart.add(oud).unwrap();
        cart.update_quantity(oud, MAX_LINE_QUANTITY).unwrap();

        assert_eq!(
            cart.add(oud),
            Err(CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY
            })
        );
        assert_eq!(cart.quantity_of(oud), Some(MAX_LINE_QUANTITY));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let musk = ProductId::generate();
        let mut cart = CartState::new();
        cart.add(musk).unwrap();

        cart.update_quantity(musk, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(musk, 3), Err(CartError::NotInCart));
    }

    #[test]
    fn test_item_count_and_clear() {
        let (a, b) = (ProductId::generate(), ProductId::generate());
        let mut cart = CartState::new();
        cart.add(a).unwrap();
        cart.add(b).unwrap();
        cart.update_quantity(b, 4).unwrap();
        assert_eq!(cart.item_count(), 5);

        assert!(cart.remove(a));
        assert!(!cart.remove(a));
        assert_eq!(cart.item_count(), 4);

        cart.clear();
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_colliding_display_ids_stay_separate_lines() {
        let a = pid("a1b2c3d4-0000-0000-0000-000000000000");
        let b = pid("a1b2c3d4-1111-2222-3333-444444444444");
        assert_eq!(DisplayId::derive(a, 0), DisplayId::derive(b, 1));

        let mut cart = CartState::new();
        assert_eq!(cart.add(a).unwrap(), CartOutcome::Added);
        assert_eq!(cart.add(b).unwrap(), CartOutcome::Added);
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn test_session_round_trip_keeps_order() {
        let (a, b) = (ProductId::generate(), ProductId::generate());
        let mut cart = CartState::new();
        cart.add(b).unwrap();
        cart.add(a).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        let restored: CartState = serde_json::from_value(json).unwrap();
        let order: Vec<_> = restored.lines().iter().map(|l| l.product_id).collect();
        assert_eq!(order, vec![b, a]);
    }

    #[test]
    fn test_merged_quantity_caps() {
        assert_eq!(merged_quantity(2, 3), 5);
        assert_eq!(merged_quantity(90, 20), MAX_LINE_QUANTITY);
    }
}
