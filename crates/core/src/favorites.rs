//! In-memory favorites model for anonymous sessions.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Saved products, in the order they were favorited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteSet {
    products: Vec<ProductId>,
}

impl FavoriteSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Flip membership. Returns `true` if the product is now a favorite.
    pub fn toggle(&mut self, product_id: ProductId) -> bool {
        if self.remove(product_id) {
            false
        } else {
            self.products.push(product_id);
            true
        }
    }

    /// Returns whether the product was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|id| *id != product_id);
        self.products.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.products.contains(&product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.iter().copied()
    }

    /// Take the products out, leaving the set empty.
    pub fn drain(&mut self) -> Vec<ProductId> {
        std::mem::take(&mut self.products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_state() {
        let keep = ProductId::generate();
        let flip = ProductId::generate();
        let mut favorites = FavoriteSet::new();
        favorites.toggle(keep);
        let before = favorites.clone();

        assert!(favorites.toggle(flip));
        assert!(favorites.contains(flip));
        assert!(!favorites.toggle(flip));
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_drain_empties() {
        let mut favorites = FavoriteSet::new();
        favorites.toggle(ProductId::generate());
        favorites.toggle(ProductId::generate());

        assert_eq!(favorites.drain().len(), 2);
        assert!(favorites.is_empty());
    }
}
