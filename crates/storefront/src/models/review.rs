//! Product review types and rating summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use essence_core::{ProductId, ReviewId, UserId};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// A customer review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    #[serde(skip)]
    pub user_id: UserId,
    pub author: String,
    pub rating: u8,
    pub title: String,
    pub content: String,
    /// The author has ordered this product.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Review validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}")]
    RatingOutOfRange,
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// A review submitted by a signed-in customer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    pub title: String,
    pub content: String,
}

impl NewReview {
    /// Check the rating range and trim the text fields.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError` for an out-of-range rating or blank text.
    pub fn validate(self) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::RatingOutOfRange);
        }
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ReviewError::MissingField("title"));
        }
        let content = self.content.trim().to_string();
        if content.is_empty() {
            return Err(ReviewError::MissingField("content"));
        }
        Ok(Self {
            rating: self.rating,
            title,
            content,
        })
    }
}

/// Count and share of reviews with a given rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: u32,
    /// Whole-number percentage of all reviews.
    pub percentage: u32,
}

/// Average rating and the 5-to-1 distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub total: u32,
    /// Mean rating to one decimal place; zero when there are no reviews.
    pub average: Decimal,
    pub distribution: Vec<RatingBucket>,
}

impl ReviewSummary {
    #[must_use]
    pub fn from_ratings(ratings: &[u8]) -> Self {
        let total = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
        let sum: u32 = ratings.iter().map(|&r| u32::from(r)).sum();

        let average = if total == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(sum) / Decimal::from(total)).round_dp(1)
        };

        let distribution = (MIN_RATING..=MAX_RATING)
            .rev()
            .map(|rating| {
                let count = u32::try_from(ratings.iter().filter(|&&r| r == rating).count())
                    .unwrap_or(u32::MAX);
                let percentage = if total == 0 {
                    0
                } else {
                    (count * 100 + total / 2) / total
                };
                RatingBucket {
                    rating,
                    count,
                    percentage,
                }
            })
            .collect();

        Self {
            total,
            average,
            distribution,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_mixed_ratings() {
        let summary = ReviewSummary::from_ratings(&[5, 4, 5, 4]);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.average, Decimal::new(45, 1));

        let ratings: Vec<u8> = summary.distribution.iter().map(|b| b.rating).collect();
        assert_eq!(ratings, [5, 4, 3, 2, 1]);
        assert_eq!(summary.distribution[0].count, 2);
        assert_eq!(summary.distribution[0].percentage, 50);
        assert_eq!(summary.distribution[4].percentage, 0);
    }

    #[test]
    fn test_summary_when_empty() {
        let summary = ReviewSummary::from_ratings(&[]);
        assert_eq!(summary.average, Decimal::ZERO);
        assert!(summary.distribution.iter().all(|b| b.count == 0 && b.percentage == 0));
        assert_eq!(summary.distribution.len(), 5);
    }

    #[test]
    fn test_average_rounds_to_one_place() {
        // 14 / 3 = 4.666..
        let summary = ReviewSummary::from_ratings(&[5, 5, 4]);
        assert_eq!(summary.average, Decimal::new(47, 1));
        assert_eq!(summary.distribution[0].percentage, 67);
    }

    #[test]
    fn test_new_review_validation() {
        let review = NewReview {
            rating: 6,
            title: "Lovely".to_string(),
            content: "Lasts all day".to_string(),
        };
        assert_eq!(review.validate().unwrap_err(), ReviewError::RatingOutOfRange);

        let review = NewReview {
            rating: 4,
            title: "  ".to_string(),
            content: "Lasts all day".to_string(),
        };
        assert_eq!(
            review.validate().unwrap_err(),
            ReviewError::MissingField("title")
        );

        let review = NewReview {
            rating: 1,
            title: " Too sweet ".to_string(),
            content: "Not for me".to_string(),
        };
        assert_eq!(review.validate().unwrap().title, "Too sweet");
    }
}
