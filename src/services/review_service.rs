//! Review service.
//!
//! Eligibility, direction and the denormalized rating maintenance all
//! live here. The review insert and the rating write-back share one
//! transaction: an observer can never see a review committed without
//! the reviewed user's counters reflecting it.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{MAX_RATING, MIN_RATING, MIN_REVIEW_COMMENT_LENGTH};
use crate::domain::{BookingStatus, Clock, Review, ReviewDirection};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Review service trait for dependency injection.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Submit a review for a completed booking and refresh the
    /// reviewed user's denormalized rating in the same transaction.
    async fn create(
        &self,
        reviewer_id: Uuid,
        booking_id: Uuid,
        rating: i16,
        comment: String,
    ) -> AppResult<Review>;

    /// Reviews attached to an item's bookings, newest first.
    async fn list_for_item(&self, item_id: Uuid) -> AppResult<Vec<Review>>;

    /// Reviews a user has received, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;
}

/// Concrete implementation of ReviewService using Unit of Work.
pub struct ReviewManager<U: UnitOfWork> {
    uow: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U: UnitOfWork> ReviewManager<U> {
    pub fn new(uow: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { uow, clock }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewManager<U> {
    async fn create(
        &self,
        reviewer_id: Uuid,
        booking_id: Uuid,
        rating: i16,
        comment: String,
    ) -> AppResult<Review> {
        let clock = self.clock.clone();

        let review = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let booking = ctx
                        .bookings()
                        .find_by_id(booking_id)
                        .await?
                        .ok_or(AppError::NotFound)?;

                    if booking.status != BookingStatus::Completed {
                        return Err(AppError::ReviewNotEligible);
                    }

                    let (direction, reviewed_user_id) = if reviewer_id == booking.renter_id {
                        (ReviewDirection::RenterToOwner, booking.owner_id)
                    } else if reviewer_id == booking.owner_id {
                        (ReviewDirection::OwnerToRenter, booking.renter_id)
                    } else {
                        return Err(AppError::Forbidden);
                    };

                    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                        return Err(AppError::validation(format!(
                            "Rating must be between {} and {}",
                            MIN_RATING, MAX_RATING
                        )));
                    }
                    let comment = comment.trim().to_string();
                    if (comment.chars().count() as u64) < MIN_REVIEW_COMMENT_LENGTH {
                        return Err(AppError::validation(format!(
                            "Review comment must be at least {} characters",
                            MIN_REVIEW_COMMENT_LENGTH
                        )));
                    }

                    let now = clock.now();
                    let review = ctx
                        .reviews()
                        .insert(
                            booking_id,
                            reviewer_id,
                            reviewed_user_id,
                            direction,
                            rating,
                            comment,
                            now,
                        )
                        .await?;

                    // Recompute the denormalized counters from the
                    // full review set so they are exact at commit time.
                    let stats = ctx.reviews().rating_stats(reviewed_user_id).await?;
                    ctx.users()
                        .update_rating(
                            reviewed_user_id,
                            stats.rating_avg,
                            stats.review_count,
                            now,
                        )
                        .await?;

                    Ok(review)
                })
            })
            .await?;

        tracing::info!(
            review_id = %review.id,
            booking_id = %review.booking_id,
            reviewed_user_id = %review.reviewed_user_id,
            "Review created"
        );
        Ok(review)
    }

    async fn list_for_item(&self, item_id: Uuid) -> AppResult<Vec<Review>> {
        self.uow
            .items()
            .find_by_id(item_id)
            .await?
            .ok_or(AppError::NotFound)?;

        self.uow.reviews().list_for_item(item_id).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        self.uow.reviews().list_for_user(user_id).await
    }
}
