//! Product reviews.

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use essence_core::ProductId;

use super::ServiceError;
use super::catalog::CatalogCache;
use crate::db::ReviewRepository;
use crate::models::{CurrentUser, NewReview, Review, ReviewSummary};

/// Reviews for a product with their summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProductReviews {
    pub summary: ReviewSummary,
    pub reviews: Vec<Review>,
}

/// List a product's reviews, newest first.
///
/// # Errors
///
/// Returns `ServiceError::ProductNotFound` for an unknown product.
pub async fn list(
    pool: &PgPool,
    catalog: &CatalogCache,
    product_id: ProductId,
) -> Result<ProductReviews, ServiceError> {
    ensure_product(pool, catalog, product_id).await?;

    let reviews = ReviewRepository::new(pool)
        .list_for_product(product_id)
        .await?;
    let ratings: Vec<u8> = reviews.iter().map(|review| review.rating).collect();

    Ok(ProductReviews {
        summary: ReviewSummary::from_ratings(&ratings),
        reviews,
    })
}

/// Submit a review as the signed-in user.
///
/// # Errors
///
/// Returns `ServiceError::InvalidReview` for a bad rating or blank text and
/// `ServiceError::ProductNotFound` for an unknown product.
#[instrument(skip(pool, catalog, user, review), fields(user_id = %user.id))]
pub async fn submit(
    pool: &PgPool,
    catalog: &CatalogCache,
    user: &CurrentUser,
    product_id: ProductId,
    review: NewReview,
) -> Result<Review, ServiceError> {
    let review = review.validate()?;
    ensure_product(pool, catalog, product_id).await?;

    Ok(ReviewRepository::new(pool)
        .create(product_id, user.id, &author_name(user), &review)
        .await?)
}

async fn ensure_product(
    pool: &PgPool,
    catalog: &CatalogCache,
    product_id: ProductId,
) -> Result<(), ServiceError> {
    let catalog = catalog.load(pool).await?;
    if catalog.get(product_id).is_none() {
        return Err(ServiceError::ProductNotFound);
    }
    Ok(())
}

/// Name shown on a review: the profile name, else the email's local part.
fn author_name(user: &CurrentUser) -> String {
    user.full_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| user.email.local_part().to_string(), str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use essence_core::{Email, UserId};

    use super::*;

    fn user(full_name: Option<&str>) -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("ana.silva@example.com").unwrap(),
            full_name: full_name.map(str::to_string),
        }
    }

    #[test]
    fn test_author_prefers_full_name() {
        assert_eq!(author_name(&user(Some("Ana Silva"))), "Ana Silva");
    }

    #[test]
    fn test_author_falls_back_to_email_local_part() {
        assert_eq!(author_name(&user(None)), "ana.silva");
        assert_eq!(author_name(&user(Some("  "))), "ana.silva");
    }
}
