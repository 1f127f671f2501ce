//! Seed the product catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Rose Garden
//!     price: "89.00"
//!     category: Floral
//!     image: https://images.example.com/rose-garden.jpg
//!     description: Damask rose over a soft musk base.
//! ```
//!
//! Products are matched by name: existing ones are updated, new ones inserted.
//! Every entry is validated before anything is written.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use essence_storefront::db::{ProductRepository, RepositoryError};
use essence_storefront::models::{ProductError, ProductInput, ValidProduct};

use super::{ConnectError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid product '{name}': {source}")]
    InvalidProduct { name: String, source: ProductError },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Top-level shape of the seed file.
#[derive(Debug, Deserialize)]
struct ProductCatalog {
    products: Vec<ProductInput>,
}

/// Upsert every product in `file`.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or parsed, an entry fails
/// validation, or a database write fails.
pub async fn products(file: &Path) -> Result<(), SeedError> {
    let contents = std::fs::read_to_string(file).map_err(|source| SeedError::Read {
        path: file.display().to_string(),
        source,
    })?;
    let products = parse_catalog(&contents)?;
    tracing::info!("Loaded {} products from {}", products.len(), file.display());

    let pool = connect().await?;
    let repo = ProductRepository::new(&pool);

    let mut inserted = 0_usize;
    for product in &products {
        if repo.upsert_by_name(product).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        "Seeding complete! Inserted: {}, Updated: {}",
        inserted,
        products.len() - inserted
    );
    Ok(())
}

/// Parse and validate the YAML catalog.
fn parse_catalog(contents: &str) -> Result<Vec<ValidProduct>, SeedError> {
    let catalog: ProductCatalog = serde_yaml::from_str(contents)?;

    catalog
        .products
        .into_iter()
        .map(|input| {
            let name = input.name.clone();
            input
                .validate()
                .map_err(|source| SeedError::InvalidProduct { name, source })
        })
        .collect()
}
