//! Persistent cart repository.
//!
//! One row per `(user_id, product_id)`. Increments are single upserts so two
//! concurrent adds of the same product never lose an update.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use essence_core::cart::MAX_LINE_QUANTITY;
use essence_core::catalog::Product;
use essence_core::{ProductId, UserId};

use super::products::ProductRow;
use super::{RepositoryError, quantity_from_db, quantity_to_db};

/// Cart line joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: Uuid,
    name: String,
    price: Decimal,
    image: Option<String>,
    description: Option<String>,
    category: String,
    quantity: i32,
}

/// Result of an increment upsert.
#[derive(Debug, sqlx::FromRow)]
struct IncrementRow {
    quantity: i32,
    inserted: bool,
}

/// Outcome of [`CartRepository::increment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Increment {
    /// A new line was created with quantity 1.
    Inserted,
    /// An existing line now holds this quantity.
    Incremented(u32),
    /// The line is already at the maximum quantity.
    AtLimit,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's cart lines with their products, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<(Product, u32)>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT p.id, p.name, p.price, p.image, p.description, p.category, c.quantity
            FROM cart c
            JOIN products p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(line_from_row).collect()
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists and
    /// `RepositoryError::Database` if the upsert fails.
    pub async fn increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Increment, RepositoryError> {
        let row = sqlx::query_as::<_, IncrementRow>(
            r"
            INSERT INTO cart (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart.quantity + 1, updated_at = NOW()
            WHERE cart.quantity < $3
            RETURNING quantity, (xmax = 0) AS inserted
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity_to_db(MAX_LINE_QUANTITY))
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_foreign_key)?;

        match row {
            None => Ok(Increment::AtLimit),
            Some(row) if row.inserted => Ok(Increment::Inserted),
            Some(row) => Ok(Increment::Incremented(quantity_from_db(row.quantity)?)),
        }
    }

    /// Set the quantity of an existing line. Returns `false` if there is no line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart SET quantity = $3, updated_at = NOW()
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity_to_db(quantity))
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a line. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        clear_in(&mut conn, user_id).await
    }

    /// Total units in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM cart WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        u32::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("cart count {total}")))
    }
}

/// Read cart lines for checkout, locking them until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn list_for_checkout_in(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<(Product, u32)>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT p.id, p.name, p.price, p.image, p.description, p.category, c.quantity
        FROM cart c
        JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.created_at, c.id
        FOR UPDATE OF c
        ",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(line_from_row).collect()
}

fn line_from_row(row: CartLineRow) -> Result<(Product, u32), RepositoryError> {
    let quantity = quantity_from_db(row.quantity)?;
    let product = Product::try_from(ProductRow {
        id: row.id,
        name: row.name,
        price: row.price,
        image: row.image,
        description: row.description,
        category: row.category,
    })?;
    Ok((product, quantity))
}

/// Remove every line on an open connection or transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn clear_in(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM cart WHERE user_id = $1")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Fold a guest line into the user's cart inside a transaction.
///
/// Quantities add up and are capped at the line maximum. Lines for products
/// that no longer exist are skipped.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the upsert fails.
pub async fn merge_line_in(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), RepositoryError> {
    let quantity = quantity.min(MAX_LINE_QUANTITY);
    if quantity == 0 {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO cart (user_id, product_id, quantity)
        SELECT $1, p.id, $3 FROM products p WHERE p.id = $2
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = LEAST(cart.quantity + EXCLUDED.quantity, $4),
                      updated_at = NOW()
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity_to_db(quantity))
    .bind(quantity_to_db(MAX_LINE_QUANTITY))
    .execute(conn)
    .await?;

    Ok(())
}
