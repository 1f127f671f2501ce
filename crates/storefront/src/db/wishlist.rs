//! Wishlist (favorites) repository.

use sqlx::{PgConnection, PgPool};

use essence_core::catalog::Product;
use essence_core::{ProductId, UserId};

use super::RepositoryError;
use super::products::ProductRow;

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Favorited products, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.name, p.price, p.image, p.description, p.category
            FROM wishlist w
            JOIN products p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC, w.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Whether a product is favorited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM wishlist WHERE user_id = $1 AND product_id = $2)",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Flip a product's favorite state. Returns `true` if it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists and
    /// `RepositoryError::Database` if a statement fails.
    pub async fn toggle(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let favorite = removed.rows_affected() == 0;
        if favorite && !insert_in(&mut *tx, user_id, product_id).await? {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(favorite)
    }

    /// Number of favorites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishlist WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        u32::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("wishlist count {total}")))
    }
}

/// Add a favorite, ignoring duplicates and unknown products. Returns `false`
/// when no row was written.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_in(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        INSERT INTO wishlist (user_id, product_id)
        SELECT $1, p.id FROM products p WHERE p.id = $2
        ON CONFLICT (user_id, product_id) DO NOTHING
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
