//! Cart response types.

use serde::Serialize;

use essence_core::Price;

use super::ProductView;

/// A cart line: the product plus its quantity.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub product: ProductView,
    pub quantity: u32,
    pub line_total: Price,
}

impl CartItemView {
    #[must_use]
    pub fn new(product: ProductView, quantity: u32) -> Self {
        let line_total = product.price * quantity;
        Self {
            product,
            quantity,
            line_total,
        }
    }
}

/// The whole cart with its badge count and subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: Price,
}

impl CartView {
    #[must_use]
    pub fn new(items: Vec<CartItemView>) -> Self {
        let item_count = items.iter().map(|item| item.quantity).sum();
        let subtotal = items.iter().map(|item| item.line_total).sum();
        Self {
            items,
            item_count,
            subtotal,
        }
    }

    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use essence_core::catalog::Product;
    use essence_core::ProductId;

    use super::*;

    fn view(cents: u32) -> ProductView {
        let product = Product {
            id: ProductId::generate(),
            name: "Neroli Bloom".to_string(),
            price: Price::from_cents(cents),
            image: None,
            description: None,
            category: "Citrus".to_string(),
        };
        ProductView::new(&product, 0)
    }

    #[test]
    fn test_totals() {
        let cart = CartView::new(vec![
            CartItemView::new(view(4500), 2),
            CartItemView::new(view(1999), 1),
        ]);
        assert_eq!(cart.item_count, 3);
        assert_eq!(cart.subtotal, Price::from_cents(10_999));
        assert_eq!(cart.items[0].line_total, Price::from_cents(9000));
    }

    #[test]
    fn test_empty() {
        let cart = CartView::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.subtotal, Price::ZERO);
    }
}
