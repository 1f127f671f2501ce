//! Product response type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use essence_core::catalog::Product;
use essence_core::{DisplayId, Price, ProductId};

/// Product validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("image must be an absolute http(s) URL")]
    InvalidImage,
}

/// Product fields submitted from the admin panel or a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
}

/// A validated [`ProductInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: String,
}

impl ProductInput {
    /// Trim fields and check them.
    ///
    /// # Errors
    ///
    /// Returns `ProductError` for blank name or category, a negative price,
    /// or an image that is not an absolute http(s) URL.
    pub fn validate(self) -> Result<ValidProduct, ProductError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProductError::MissingField("name"));
        }
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(ProductError::MissingField("category"));
        }
        let price = Price::new(self.price).map_err(|_| ProductError::NegativePrice)?;

        let image = match self.image.map(|i| i.trim().to_string()) {
            Some(image) if !image.is_empty() => {
                let url = Url::parse(&image).map_err(|_| ProductError::InvalidImage)?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ProductError::InvalidImage);
                }
                Some(image)
            }
            _ => None,
        };

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(ValidProduct {
            name,
            price,
            image,
            description,
            category,
        })
    }
}

/// A product as returned by the API.
///
/// `id` is the numeric display id and is not unique. Clients must send
/// `original_id` back for every cart, favorite or review operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: DisplayId,
    pub original_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category: String,
}

impl ProductView {
    /// Build the view for a product rendered at `index` in a list.
    #[must_use]
    pub fn new(product: &Product, index: usize) -> Self {
        Self {
            id: DisplayId::derive(product.id, index),
            original_id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
        }
    }

    /// Views for a whole listing, in order.
    #[must_use]
    pub fn list(products: &[Product]) -> Vec<Self> {
        products
            .iter()
            .enumerate()
            .map(|(index, product)| Self::new(product, index))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_keeps_uuid_alongside_display_id() {
        let product = Product {
            id: "550e8400-e29b-41d4-a716-446655440000".parse().unwrap(),
            name: "Velvet Oud".to_string(),
            price: Price::from_cents(14_500),
            image: None,
            description: None,
            category: "Woody".to_string(),
        };

        let view = ProductView::new(&product, 3);
        assert_eq!(view.id.get(), 858_083_247);
        assert_eq!(view.original_id, product.id);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 858_083_247);
        assert_eq!(json["original_id"], "550e8400-e29b-41d4-a716-446655440000");
        assert_eq!(json["price"], "145.00");
    }

    fn input() -> ProductInput {
        ProductInput {
            name: " Amber Nights ".to_string(),
            price: Decimal::new(12_999, 2),
            image: Some("https://cdn.essence.shop/amber.jpg".to_string()),
            description: Some(String::new()),
            category: "Oriental".to_string(),
        }
    }

    #[test]
    fn test_input_validation_normalizes() {
        let valid = input().validate().unwrap();
        assert_eq!(valid.name, "Amber Nights");
        assert_eq!(valid.price, Price::from_cents(12_999));
        assert_eq!(valid.description, None);
    }

    #[test]
    fn test_input_validation_rejects() {
        let mut bad = input();
        bad.category = " ".to_string();
        assert_eq!(
            bad.validate().unwrap_err(),
            ProductError::MissingField("category")
        );

        let mut bad = input();
        bad.price = Decimal::new(-100, 2);
        assert_eq!(bad.validate().unwrap_err(), ProductError::NegativePrice);

        let mut bad = input();
        bad.image = Some("/images/amber.jpg".to_string());
        assert_eq!(bad.validate().unwrap_err(), ProductError::InvalidImage);

        let mut bad = input();
        bad.image = Some("javascript:alert(1)".to_string());
        assert_eq!(bad.validate().unwrap_err(), ProductError::InvalidImage);
    }
}
