//! Product review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use essence_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::{NewReview, Review};

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    author: String,
    rating: i16,
    title: String,
    content: String,
    verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid rating {} on review {}", row.rating, row.id))
        })?;

        Ok(Self {
            id: ReviewId::new(row.id),
            product_id: ProductId::new(row.product_id),
            user_id: UserId::new(row.user_id),
            author: row.author,
            rating,
            title: row.title,
            content: row.content,
            verified: row.verified,
            created_at: row.created_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// A review is verified when its author has ordered the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r"
            SELECT r.id, r.product_id, r.user_id, r.author, r.rating, r.title, r.content,
                   EXISTS (
                       SELECT 1 FROM order_items oi
                       JOIN orders o ON o.id = oi.order_id
                       WHERE o.user_id = r.user_id AND oi.product_id = r.product_id
                   ) AS verified,
                   r.created_at
            FROM product_reviews r
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC, r.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Store a validated review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// foreign key violation for an unknown product).
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: UserId,
        author: &str,
        review: &NewReview,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            r"
            WITH inserted AS (
                INSERT INTO product_reviews (product_id, user_id, author, rating, title, content)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, product_id, user_id, author, rating, title, content, created_at
            )
            SELECT i.id, i.product_id, i.user_id, i.author, i.rating, i.title, i.content,
                   EXISTS (
                       SELECT 1 FROM order_items oi
                       JOIN orders o ON o.id = oi.order_id
                       WHERE o.user_id = i.user_id AND oi.product_id = i.product_id
                   ) AS verified,
                   i.created_at
            FROM inserted i
            ",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(author)
        .bind(i16::from(review.rating))
        .bind(&review.title)
        .bind(&review.content)
        .fetch_one(self.pool)
        .await?;

        Review::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_rating_is_corruption() {
        let row = ReviewRow {
            id: Uuid::nil(),
            product_id: Uuid::nil(),
            user_id: Uuid::nil(),
            author: "Ana".to_string(),
            rating: -2,
            title: "Lovely".to_string(),
            content: "Lasts all day".to_string(),
            verified: false,
            created_at: Utc::now(),
        };
        assert!(matches!(
            Review::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
