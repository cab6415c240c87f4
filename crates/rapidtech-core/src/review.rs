//! # Review Board Rules
//!
//! ```text
//! submit ──► validate rating (1..=5) ──► product exists? ──► Review { pending }
//!
//! moderation:  pending ──► approved | rejected   (later overwrites allowed)
//!
//! listing:     shoppers see approved only
//!              admins may ask for pending/rejected as well
//! ```
//!
//! Rating is checked before the product lookup, so a bad rating on a
//! missing product reports `InvalidRating`.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::types::{Review, ReviewStatus};
use crate::validation::validate_rating;

/// Builds a pending review after checking the rating.
///
/// The caller is responsible for confirming the product exists.
pub fn new_review(
    user_id: &str,
    product_id: &str,
    rating: i64,
    comment: &str,
    now: DateTime<Utc>,
) -> CoreResult<Review> {
    validate_rating(rating)?;

    Ok(Review {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        product_id: product_id.to_string(),
        rating,
        comment: comment.to_string(),
        status: ReviewStatus::Pending,
        created_at: now,
    })
}

/// Whether a review appears in a listing.
#[inline]
pub fn is_listed(review: &Review, include_pending: bool) -> bool {
    include_pending || review.status == ReviewStatus::Approved
}

/// Newest first; ties broken by id (descending) so both backends agree.
pub fn newest_first(a: &Review, b: &Review) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Status applied when a moderator gives none.
pub fn moderation_status(requested: Option<ReviewStatus>) -> ReviewStatus {
    requested.unwrap_or(ReviewStatus::Approved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_new_review_is_pending() {
        let r = new_review("u", "p", 4, "solid keyboard", Utc::now()).unwrap();
        assert_eq!(r.status, ReviewStatus::Pending);
        assert!(!is_listed(&r, false));
        assert!(is_listed(&r, true));
    }

    #[test]
    fn test_rating_range() {
        assert!(matches!(
            new_review("u", "p", 6, "", Utc::now()),
            Err(CoreError::InvalidRating { rating: 6, .. })
        ));
        assert!(new_review("u", "p", 0, "", Utc::now()).is_err());
        assert!(new_review("u", "p", 1, "", Utc::now()).is_ok());
    }

    #[test]
    fn test_default_moderation_is_approve() {
        assert_eq!(moderation_status(None), ReviewStatus::Approved);
        assert_eq!(
            moderation_status(Some(ReviewStatus::Rejected)),
            ReviewStatus::Rejected
        );
    }
}
