//! Cached product catalog.
//!
//! The whole catalog is small enough to hold in memory. It is loaded once,
//! cached with `moka` for the configured TTL, and dropped by every admin
//! product write.
//!
//! Entries are keyed by a generation that `invalidate` bumps. A load that was
//! already reading the table when the generation moved stores its result under
//! the old key, where no later reader looks.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, warn};

use essence_core::catalog::{self, Product, ProductFilter};
use essence_core::ProductId;

use super::ServiceError;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::ProductView;

/// A loaded catalog, ordered by name.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    positions: HashMap<ProductId, usize>,
}

/// Response for a browse request.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogListing {
    pub products: Vec<ProductView>,
    pub categories: Vec<String>,
    /// Whether any filter narrowed the listing.
    pub filtered: bool,
    /// Size of the unfiltered catalog.
    pub total: usize,
}

impl Catalog {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let positions = products
            .iter()
            .enumerate()
            .map(|(index, product)| (product.id, index))
            .collect();
        Self {
            products,
            positions,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.positions
            .get(&id)
            .and_then(|&index| self.products.get(index))
    }

    /// View of a product. The display id fallback uses the product's position
    /// in the full catalog, so it does not change with filters.
    #[must_use]
    pub fn view(&self, product: &Product) -> ProductView {
        let index = self
            .positions
            .get(&product.id)
            .copied()
            .unwrap_or(self.products.len());
        ProductView::new(product, index)
    }

    /// Filtered listing with the category menu.
    #[must_use]
    pub fn listing(&self, filter: &ProductFilter) -> CatalogListing {
        let products = self
            .products
            .iter()
            .filter(|product| filter.matches(product))
            .map(|product| self.view(product))
            .collect();

        CatalogListing {
            products,
            categories: catalog::categories(&self.products),
            filtered: filter.is_active(),
            total: self.products.len(),
        }
    }
}

/// In-memory cache in front of the products table.
#[derive(Clone)]
pub struct CatalogCache {
    cache: Cache<u64, Arc<Catalog>>,
    generation: Arc<AtomicU64>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The current catalog, loading it on a miss.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be read.
    pub async fn load(&self, pool: &PgPool) -> Result<Arc<Catalog>, RepositoryError> {
        self.get_or_load(|| async move { ProductRepository::new(pool).list_all().await })
            .await
    }

    async fn get_or_load<F, Fut>(&self, fetch: F) -> Result<Arc<Catalog>, RepositoryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Product>, RepositoryError>>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        if let Some(catalog) = self.cache.get(&generation).await {
            return Ok(catalog);
        }

        let products = fetch().await?;
        debug!(count = products.len(), generation, "Loaded catalog");

        let catalog = Arc::new(Catalog::new(products));
        self.cache.insert(generation, Arc::clone(&catalog)).await;
        Ok(catalog)
    }

    /// Drop the cached catalog.
    pub async fn invalidate(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(&previous).await;
    }

    /// Map a failed write against a product the cached catalog still listed.
    ///
    /// `RepositoryError::NotFound` means the row is gone, so the cache is
    /// stale: it is dropped and the caller gets `ServiceError::ProductNotFound`.
    pub async fn product_write_error(&self, err: RepositoryError) -> ServiceError {
        match err {
            RepositoryError::NotFound => {
                warn!("Cached catalog listed a deleted product");
                self.invalidate().await;
                ServiceError::ProductNotFound
            }
            other => ServiceError::Repository(other),
        }
    }
}
