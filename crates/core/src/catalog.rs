//! Catalog products and browse filtering.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Price, ProductId};

/// Category label meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All";

/// Lower bound of the default price window.
pub const DEFAULT_MIN_PRICE_CENTS: u32 = 0;
/// Upper bound of the default price window.
pub const DEFAULT_MAX_PRICE_CENTS: u32 = 20_000;

/// A fragrance in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: String,
}

/// Browse filter. All criteria are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name and description.
    pub q: Option<String>,
    /// Category name; `All` or absent matches every category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
}

impl ProductFilter {
    fn search_term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    }

    /// Whether `product` passes every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = self.search_term() {
            let in_name = product.name.to_lowercase().contains(&term);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_name && !in_description {
                return false;
            }
        }

        if let Some(category) = self.category()
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        true
    }

    /// Filter and sort a product list by name.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut matched: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        matched.sort_by_key(|p| p.name.to_lowercase());
        matched
    }

    /// True when the filter narrows the default view: a search term, a
    /// specific category, or a price bound inside the default window.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let min_default = Price::from_cents(DEFAULT_MIN_PRICE_CENTS);
        let max_default = Price::from_cents(DEFAULT_MAX_PRICE_CENTS);

        self.search_term().is_some()
            || self.category().is_some()
            || self.min_price.is_some_and(|min| min > min_default)
            || self.max_price.is_some_and(|max| max < max_default)
    }
}

/// `All` followed by the distinct categories, alphabetically.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let distinct: BTreeSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    std::iter::once(ALL_CATEGORIES)
        .chain(distinct)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, cents: u32, category: &str, description: &str) -> Product {
        Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            price: Price::from_cents(cents),
            image: None,
            description: Some(description.to_owned()),
            category: category.to_owned(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Rose Garden", 8999, "Floral", "Bulgarian rose and peony"),
            product("Amber Nights", 12999, "Oriental", "Warm amber and vanilla"),
            product("Citrus Burst", 6999, "Citrus", "Bergamot and lemon zest"),
            product("Ocean Breeze", 7499, "Aquatic", "Sea salt with a floral heart"),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_sorts_by_name() {
        let result = ProductFilter::default().apply(&catalog());
        assert_eq!(
            names(&result),
            ["Amber Nights", "Citrus Burst", "Ocean Breeze", "Rose Garden"]
        );
    }

    #[test]
    fn test_search_matches_name_or_description() {
        let filter = ProductFilter {
            q: Some("  FLORAL ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter.apply(&catalog())), ["Ocean Breeze"]);

        let filter = ProductFilter {
            q: Some("rose".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter.apply(&catalog())), ["Rose Garden"]);
    }

    #[test]
    fn test_category_all_and_case() {
        let all = ProductFilter {
            category: Some("all".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(all.apply(&catalog()).len(), 4);

        let oriental = ProductFilter {
            category: Some("oriental".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(names(&oriental.apply(&catalog())), ["Amber Nights"]);
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = ProductFilter {
            min_price: Some(Price::from_cents(7499)),
            max_price: Some(Price::from_cents(8999)),
            ..ProductFilter::default()
        };
        assert_eq!(
            names(&filter.apply(&catalog())),
            ["Ocean Breeze", "Rose Garden"]
        );
    }

    #[test]
    fn test_is_active() {
        assert!(!ProductFilter::default().is_active());
        assert!(
            !ProductFilter {
                category: Some("All".to_owned()),
                min_price: Some(Price::ZERO),
                max_price: Some(Price::from_cents(DEFAULT_MAX_PRICE_CENTS)),
                q: Some("   ".to_owned()),
            }
            .is_active()
        );
        assert!(
            ProductFilter {
                max_price: Some(Price::from_cents(15_000)),
                ..ProductFilter::default()
            }
            .is_active()
        );
        assert!(
            ProductFilter {
                category: Some("Woody".to_owned()),
                ..ProductFilter::default()
            }
            .is_active()
        );
    }

    #[test]
    fn test_categories_lists_all_first() {
        assert_eq!(
            categories(&catalog()),
            ["All", "Aquatic", "Citrus", "Floral", "Oriental"]
        );
        assert_eq!(categories(&[]), ["All"]);
    }
}
